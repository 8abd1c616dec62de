//! Classification driver: classify, look up the parser, parse, and collect
//! the results per type.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use serde::{Serialize, Serializer};
use tracing::{debug, info};

use crate::classify::Classifier;
use crate::forms::{ParserContext, ParserRegistry};
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::reject::{RejectReason, RejectionMessage};
use crate::model::typed::ExportedMessage;

/// Driver output: records grouped by type, each group in input order.
///
/// Rejections go to [`MessageTypeId::Rejects`] and detail records to their
/// detail types.
#[derive(Debug, Default)]
pub struct ClassifiedMessages {
    by_type: BTreeMap<MessageTypeId, Vec<ExportedMessage>>,
}

impl ClassifiedMessages {
    fn push(&mut self, message_type: MessageTypeId, message: ExportedMessage) {
        self.by_type.entry(message_type).or_default().push(message);
    }

    pub fn get(&self, message_type: MessageTypeId) -> &[ExportedMessage] {
        self.by_type.get(&message_type).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rejects(&self) -> impl Iterator<Item = &RejectionMessage> {
        self.get(MessageTypeId::Rejects)
            .iter()
            .filter_map(ExportedMessage::as_rejection)
    }

    /// Record count per non-empty type.
    pub fn counts(&self) -> BTreeMap<MessageTypeId, usize> {
        self.by_type.iter().map(|(t, v)| (*t, v.len())).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MessageTypeId, &[ExportedMessage])> {
        self.by_type.iter().map(|(t, v)| (*t, v.as_slice()))
    }

    /// Total records, details included.
    pub fn len(&self) -> usize {
        self.by_type.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

impl Serialize for ClassifiedMessages {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.by_type.iter().map(|(t, v)| (t.key(), v)))
    }
}

/// Records produced for one input message, primary record first.
pub type MessageOutput = Vec<(MessageTypeId, ExportedMessage)>;

pub struct Driver {
    classifier: Classifier,
    registry: ParserRegistry,
    workers: usize,
}

impl Driver {
    pub fn new(context: Arc<ParserContext>) -> Self {
        Self {
            classifier: Classifier::new(context.clone()),
            registry: ParserRegistry::new(context),
            workers: 1,
        }
    }

    /// Worker threads for [`Driver::run`]. `0` means available parallelism.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = match workers {
            0 => thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            n => n,
        };
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn run(&self, messages: &[Arc<RawMessage>]) -> ClassifiedMessages {
        self.run_with_progress(messages, |_| {})
    }

    /// Like [`Driver::run`], calling `progress` with the number of messages
    /// each worker finishes as it goes.
    pub fn run_with_progress<F>(&self, messages: &[Arc<RawMessage>], progress: F) -> ClassifiedMessages
    where
        F: Fn(usize) + Sync,
    {
        let outputs: Vec<MessageOutput> = if self.workers <= 1 || messages.len() < 2 {
            messages
                .iter()
                .map(|raw| {
                    let out = self.process(raw);
                    progress(1);
                    out
                })
                .collect()
        } else {
            let chunk_size = messages.len().div_ceil(self.workers);
            let progress = &progress;
            thread::scope(|scope| {
                let handles: Vec<_> = messages
                    .chunks(chunk_size)
                    .map(|chunk| {
                        scope.spawn(move || {
                            chunk
                                .iter()
                                .map(|raw| {
                                    let out = self.process(raw);
                                    progress(1);
                                    out
                                })
                                .collect::<Vec<_>>()
                        })
                    })
                    .collect();
                handles
                    .into_iter()
                    .zip(messages.chunks(chunk_size))
                    .flat_map(|(handle, chunk)| {
                        // Panics outside parse() land here.
                        handle.join().unwrap_or_else(|_| {
                            chunk.iter().map(|raw| self.worker_failure(raw)).collect()
                        })
                    })
                    .collect()
            })
        };

        let mut result = ClassifiedMessages::default();
        for (message_type, message) in outputs.into_iter().flatten() {
            result.push(message_type, message);
        }
        info!(
            messages = messages.len(),
            rejects = result.get(MessageTypeId::Rejects).len(),
            types = result.by_type.len(),
            "Classification complete"
        );
        result
    }

    /// Classify and parse a single message.
    pub fn process(&self, raw: &Arc<RawMessage>) -> MessageOutput {
        let message_type = self.classifier.classify(raw);
        let Some(parser) = self.registry.get(message_type) else {
            debug!(message_id = %raw.message_id, %message_type, "No parser registered");
            return vec![(
                MessageTypeId::Rejects,
                ExportedMessage::Rejected(RejectionMessage::new(
                    raw.clone(),
                    RejectReason::UnsupportedType,
                    format!("no parser for {message_type}"),
                    message_type,
                )),
            )];
        };

        match parser.parse(raw) {
            Ok(typed) => {
                let details = typed.details();
                let mut out = Vec::with_capacity(1 + details.len());
                out.push((typed.message_type(), ExportedMessage::Typed(typed)));
                out.extend(
                    details
                        .into_iter()
                        .map(|d| (d.message_type(), ExportedMessage::Detail(d))),
                );
                out
            }
            Err(rejection) => vec![(MessageTypeId::Rejects, ExportedMessage::Rejected(rejection))],
        }
    }

    fn worker_failure(&self, raw: &Arc<RawMessage>) -> MessageOutput {
        vec![(
            MessageTypeId::Rejects,
            ExportedMessage::Rejected(RejectionMessage::new(
                raw.clone(),
                RejectReason::ProcessingError,
                "worker thread panicked",
                MessageTypeId::Plain,
            )),
        )]
    }
}
