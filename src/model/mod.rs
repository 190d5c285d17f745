//! Core data model types: parsed mailbox messages and the JSON output record.

pub mod message;
pub mod record;
