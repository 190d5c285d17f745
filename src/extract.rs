//! Mailbox extraction: pick MBOX entries out of an archive walk and turn
//! every message into an [`EmailRecord`].

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tracing::{debug, info};

use crate::archive::buffer::BufferLimits;
use crate::archive::walker::{walk_archive, WalkOptions};
use crate::config::Config;
use crate::error::{ExtractError, Result};
use crate::model::record::EmailRecord;
use crate::parser::mbox::MboxScanner;

/// Size of the read buffer wrapped around the top-level archive and each mailbox stream.
const READ_BUFFER_SIZE: usize = 128 * 1024;

/// Everything that controls an extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Archive traversal settings.
    pub walk: WalkOptions,
    /// Entry name suffixes treated as MBOX content.
    pub mailbox_suffixes: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ExtractOptions {
    fn from(config: &Config) -> Self {
        Self {
            walk: WalkOptions {
                nested_extension: config.archive.nested_extension.clone(),
                limits: BufferLimits {
                    memory_limit: config.archive.memory_limit,
                    max_size: config.archive.max_nested_size,
                },
            },
            mailbox_suffixes: config.mailbox.suffixes.clone(),
        }
    }
}

impl ExtractOptions {
    /// Whether an entry with this base name holds MBOX content.
    pub fn is_mailbox_name(&self, name: &str) -> bool {
        self.mailbox_suffixes
            .iter()
            .any(|suffix| !suffix.is_empty() && name.ends_with(suffix.as_str()))
    }
}

/// Extract every message from every mailbox inside the zip archive at `path`.
///
/// All-or-nothing: the first failure anywhere in the tree is returned and
/// nothing collected so far survives.
pub fn extract_emails_from_zip(
    path: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<Vec<EmailRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ExtractError::FileNotFound(path.to_path_buf())
        } else {
            ExtractError::io(path, e)
        }
    })?;
    let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    extract_emails(reader, &path.display().to_string(), options)
}

/// Same as [`extract_emails_from_zip`] for an already-open archive.
pub fn extract_emails<R: Read + Seek>(
    reader: R,
    display_path: &str,
    options: &ExtractOptions,
) -> Result<Vec<EmailRecord>> {
    let mut emails: Vec<EmailRecord> = Vec::new();
    let mut mailboxes: u64 = 0;

    let stats = walk_archive(reader, display_path, &options.walk, &mut |entry| {
        if !options.is_mailbox_name(entry.name) {
            debug!(path = entry.path, "Skipping non-mailbox entry");
            return Ok(());
        }
        let count = extract_mailbox(entry.reader, &mut emails)?;
        mailboxes += 1;
        info!(path = entry.path, messages = count, "Scanned mailbox");
        Ok(())
    })?;

    info!(
        archives = stats.archives,
        entries = stats.entries,
        mailboxes,
        messages = emails.len(),
        "Extraction complete"
    );

    Ok(emails)
}

/// Scan one mailbox stream, appending a record per message to `out`.
///
/// Returns the number of messages found. A mailbox with no messages is not
/// an error.
pub fn extract_mailbox<R: Read>(reader: R, out: &mut Vec<EmailRecord>) -> Result<usize> {
    let scanner = MboxScanner::new(BufReader::with_capacity(READ_BUFFER_SIZE, reader));
    let mut count = 0;
    for message in scanner {
        out.push(EmailRecord::from_message(&message?)?);
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_MESSAGE: &[u8] = b"From x@y.com Mon Jan  2 15:04:05 2006\n\
From: x@y.com\n\
Date: Mon, 2 Jan 2006 15:04:05 -0700\n\
\n\
hi\n";

    #[test]
    fn test_mailbox_suffixes() {
        let options = ExtractOptions::default();
        assert!(options.is_mailbox_name("inbox.mbox"));
        assert!(options.is_mailbox_name("inbox.mbox.txt"));
        assert!(!options.is_mailbox_name("notes.txt"));
        assert!(!options.is_mailbox_name("inbox.MBOX"));
        assert!(!options.is_mailbox_name("inbox.mbox.bak"));
    }

    #[test]
    fn test_empty_suffix_matches_nothing() {
        let options = ExtractOptions {
            mailbox_suffixes: vec![String::new(), ".mbox".to_string()],
            ..ExtractOptions::default()
        };
        assert!(!options.is_mailbox_name("notes.txt"));
        assert!(options.is_mailbox_name("inbox.mbox"));
    }

    #[test]
    fn test_extract_mailbox_single_message() {
        let mut out = Vec::new();
        let count = extract_mailbox(ONE_MESSAGE, &mut out).unwrap();
        assert_eq!(count, 1);
        assert_eq!(out[0].from, "x@y.com");
        assert_eq!(out[0].body, "hi");
        assert_eq!(out[0].to, "");
    }

    #[test]
    fn test_extract_mailbox_empty() {
        let mut out = Vec::new();
        assert_eq!(extract_mailbox(&b""[..], &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_extract_mailbox_bad_date() {
        let input = b"From x@y.com Mon Jan  2 15:04:05 2006\n\
Date: 2006-01-02T15:04:05Z\n\
\n\
hi\n";
        let mut out = Vec::new();
        let err = extract_mailbox(&input[..], &mut out).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidDate { .. }));
    }

    #[test]
    fn test_missing_archive() {
        let err = extract_emails_from_zip(
            "/definitely/not/here.zip",
            &ExtractOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound(_)));
    }
}
