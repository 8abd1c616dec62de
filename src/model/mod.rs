//! Core data model: raw messages, type ids, typed records and rejections.

pub mod address;
pub mod location;
pub mod message_type;
pub mod raw;
pub mod reject;
pub mod typed;
