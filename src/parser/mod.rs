//! Mailbox parsing: streaming MBOX scanner, header blocks, and `Date:` values.

pub mod date;
pub mod header;
pub mod mbox;
