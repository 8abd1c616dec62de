//! ICS-205A Communications List and ICS-217A Communications Resource
//! Availability Worksheet.

use std::sync::Arc;

use serde::Serialize;

use super::ics::IcsHeader;
use super::{all_empty, numbered_rows, viewer_document, FormParser};
use crate::error::ExtractError;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::typed::TypedMessage;
use crate::toolkit::xml::FormDocument;
use crate::toolkit::FieldSource;

pub const MAX_CONTACTS: usize = 32;
pub const MAX_AVAILABLE_CHANNELS: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct CommunicationsContact {
    pub assignment: String,
    pub name: String,
    /// Phone, pager, cell, radio call sign and so on.
    pub method: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics205AMessage {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub contacts: Vec<CommunicationsContact>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailableChannel {
    pub configuration: String,
    pub channel_name: String,
    pub eligible_users: String,
    pub rx_frequency: String,
    pub rx_narrow_wide: String,
    pub rx_tone: String,
    pub tx_frequency: String,
    pub tx_narrow_wide: String,
    pub tx_tone: String,
    pub mode: String,
    pub remarks: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics217AMessage {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub frequency_band: String,
    pub description: String,
    pub channels: Vec<AvailableChannel>,
}

impl Ics217AMessage {
    /// Channels that list a receive frequency with no transmit frequency.
    pub fn receive_only(&self) -> impl Iterator<Item = &AvailableChannel> {
        self.channels
            .iter()
            .filter(|c| !c.rx_frequency.is_empty() && c.tx_frequency.is_empty())
    }
}

pub struct Ics205AParser;

impl FormParser for Ics205AParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::Ics205A
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::Ics205A)?;
        let contacts = numbered_rows(MAX_CONTACTS, |i| {
            let contact = CommunicationsContact {
                assignment: doc.value(&format!("assignment{i}")),
                name: doc.value(&format!("name{i}")),
                method: doc.value(&format!("method{i}")),
            };
            (!all_empty(&[&contact.assignment, &contact.name, &contact.method])).then_some(contact)
        });
        Ok(TypedMessage::Ics205A(Ics205AMessage {
            raw: raw.clone(),
            header: IcsHeader::read(&doc),
            contacts,
        }))
    }
}

pub struct Ics217AParser;

fn channel(doc: &FormDocument, i: usize) -> Option<AvailableChannel> {
    let tag = |name: &str| doc.value(&format!("{name}{i}"));
    let c = AvailableChannel {
        configuration: tag("config"),
        channel_name: tag("chname"),
        eligible_users: tag("users"),
        rx_frequency: tag("rxfreq"),
        rx_narrow_wide: tag("rxnw"),
        rx_tone: tag("rxtone"),
        tx_frequency: tag("txfreq"),
        tx_narrow_wide: tag("txnw"),
        tx_tone: tag("txtone"),
        mode: tag("mode"),
        remarks: tag("remarks"),
    };
    (!all_empty(&[&c.channel_name, &c.rx_frequency, &c.tx_frequency, &c.remarks])).then_some(c)
}

impl FormParser for Ics217AParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::Ics217A
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::Ics217A)?;
        Ok(TypedMessage::Ics217A(Ics217AMessage {
            raw: raw.clone(),
            header: IcsHeader::read(&doc),
            frequency_band: doc.value("band"),
            description: doc.value("description"),
            channels: numbered_rows(MAX_AVAILABLE_CHANNELS, |i| channel(&doc, i)),
        }))
    }
}
