//! `mboxzip2json` — pull every email out of the MBOX files buried in a
//! (possibly nested) zip archive.
//!
//! The library walks the archive tree depth-first, scans each `.mbox` /
//! `.mbox.txt` entry as a stream, and returns one [`EmailRecord`] per message
//! in discovery order.
//!
//! [`EmailRecord`]: model::record::EmailRecord

pub mod archive;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod parser;

pub use error::{ExtractError, Result};
pub use extract::{extract_emails, extract_emails_from_zip, ExtractOptions};
