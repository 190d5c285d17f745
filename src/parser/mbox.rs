//! Streaming MBOX scanner.
//!
//! Reads any `BufRead` line by line and yields one [`MailboxMessage`] per
//! `From ` separator. Never holds more than the current message in memory.

use std::io::BufRead;

use tracing::warn;

use crate::error::{ExtractError, Result};
use crate::model::message::MailboxMessage;
use crate::parser::header;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Iterator over the messages of a mailbox stream.
///
/// Framing rules:
///
/// - The stream must start with a `From ` line (a UTF-8 BOM and leading blank
///   lines are skipped). An empty stream yields no messages.
/// - Every later line starting with `From ` opens a new message. Body lines the
///   writer escaped as `>From ` are left untouched.
/// - The header block runs up to the first empty line; the rest is the body.
/// - The blank line before the next separator and the final line terminator
///   belong to the framing and are stripped from the body.
///
/// After the first error the iterator is fused and yields `None`.
pub struct MboxScanner<R> {
    reader: R,
    line: Vec<u8>,
    line_no: u64,
    started: bool,
    done: bool,
    /// The last line read was a separator opening the next message.
    at_separator: bool,
}

impl<R: BufRead> MboxScanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::with_capacity(4096),
            line_no: 0,
            started: false,
            done: false,
            at_separator: false,
        }
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> u64 {
        self.line_no
    }

    /// Read the next line into `self.line`. Returns `false` at EOF.
    fn read_line(&mut self) -> Result<bool> {
        self.line.clear();
        let n = self
            .reader
            .read_until(b'\n', &mut self.line)
            .map_err(|e| ExtractError::io("<mbox stream>", e))?;
        if n == 0 {
            return Ok(false);
        }
        self.line_no += 1;
        if self.line_no == 1 && self.line.starts_with(UTF8_BOM) {
            self.line.drain(..UTF8_BOM.len());
        }
        Ok(true)
    }

    /// Position on the first separator. Returns `false` for an empty stream.
    fn start(&mut self) -> Result<bool> {
        while self.read_line()? {
            if is_empty_line(&self.line) {
                continue;
            }
            if is_mbox_separator(&self.line) {
                self.at_separator = true;
                return Ok(true);
            }
            return Err(ExtractError::InvalidMbox {
                line: self.line_no,
                reason: format!(
                    "expected 'From ' separator, found {:?}",
                    String::from_utf8_lossy(trim_line_ending(&self.line))
                ),
            });
        }
        Ok(false)
    }

    /// Read one message; the separator line has already been consumed.
    fn read_message(&mut self) -> Result<MailboxMessage> {
        self.at_separator = false;

        let header_start = self.line_no + 1;
        let mut header_buf: Vec<u8> = Vec::with_capacity(4096);
        let mut in_body = false;

        while self.read_line()? {
            if is_mbox_separator(&self.line) {
                // Header-only message
                self.at_separator = true;
                break;
            }
            if is_empty_line(&self.line) {
                in_body = true;
                break;
            }
            header_buf.extend_from_slice(&self.line);
        }

        let headers = header::parse_header_block(&header_buf, header_start)?;
        let mut body: Vec<u8> = Vec::new();

        if in_body {
            let mut prev_line_was_empty = true;
            let mut last_line_start = 0;
            while self.read_line()? {
                if is_mbox_separator(&self.line) {
                    if !prev_line_was_empty {
                        warn!(
                            line = self.line_no,
                            "Found 'From ' separator without preceding blank line"
                        );
                    }
                    self.at_separator = true;
                    break;
                }
                last_line_start = body.len();
                body.extend_from_slice(&self.line);
                prev_line_was_empty = is_empty_line(&self.line);
            }

            if prev_line_was_empty {
                body.truncate(last_line_start);
            }
            let kept = trim_line_ending(&body).len();
            body.truncate(kept);
        }

        Ok(MailboxMessage { headers, body })
    }
}

impl<R: BufRead> Iterator for MboxScanner<R> {
    type Item = Result<MailboxMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            match self.start() {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        if !self.at_separator {
            self.done = true;
            return None;
        }

        let result = self.read_message();
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

/// Check whether a line is an MBOX separator (`From ` at the start).
fn is_mbox_separator(line: &[u8]) -> bool {
    line.starts_with(b"From ")
}

/// Check whether a line is empty apart from its terminator.
fn is_empty_line(line: &[u8]) -> bool {
    trim_line_ending(line).is_empty()
}

/// Strip one trailing `\n` or `\r\n`.
fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
