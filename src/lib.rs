//! `rmsforms`: classify Winlink exercise messages by form type and extract
//! them into typed records.
//!
//! Each message is classified into exactly one [`model::message_type::MessageTypeId`],
//! handed to that type's parser, and comes out as a typed record or as a
//! rejection that says why extraction failed.

pub mod classify;
pub mod config;
pub mod driver;
pub mod error;
pub mod forms;
pub mod model;
pub mod parser;
pub mod toolkit;
