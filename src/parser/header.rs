//! RFC 5322 header block parsing: folding, key canonicalization, repeated names.

use crate::error::{ExtractError, Result};
use crate::model::message::HeaderMap;

/// Parse a raw header block (without the terminating blank line).
///
/// `first_line` is the line number of the block inside the mailbox stream,
/// used only for error messages.
pub fn parse_header_block(raw: &[u8], first_line: u64) -> Result<HeaderMap> {
    let text = decode_header_bytes(raw);
    let mut map = HeaderMap::new();
    for (name, value) in unfold_headers(&text, first_line)? {
        map.append(name, value);
    }
    Ok(map)
}

/// Decode raw header bytes to a string.
///
/// Invalid UTF-8 sequences become U+FFFD.
fn decode_header_bytes(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Unfold headers: join continuation lines (starting with space or tab) with the previous header.
///
/// Returns `(canonical_name, value)` pairs in arrival order.
fn unfold_headers(text: &str, first_line: u64) -> Result<Vec<(String, String)>> {
    let mut result: Vec<(String, String)> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line_no = first_line + i as u64;
        if line.starts_with(' ') || line.starts_with('\t') {
            let Some(last) = result.last_mut() else {
                return Err(malformed(line_no, line));
            };
            let folded = line.trim();
            if !folded.is_empty() {
                if !last.1.is_empty() {
                    last.1.push(' ');
                }
                last.1.push_str(folded);
            }
            continue;
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(malformed(line_no, line));
        };
        if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(malformed(line_no, line));
        }
        result.push((canonical_header_key(name), value.trim().to_string()));
    }

    Ok(result)
}

fn malformed(line: u64, content: &str) -> ExtractError {
    ExtractError::MalformedHeader {
        line,
        content: content.to_string(),
    }
}

/// Canonical MIME form of a header name: the first letter and any letter
/// following a hyphen are upper case, the rest lower case (`cc` → `Cc`,
/// `MESSAGE-ID` → `Message-Id`).
pub fn canonical_header_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unfold_headers() {
        let text = "Subject: This is a long\n\tsubject line\nFrom: user@example.com\n";
        let headers = unfold_headers(text, 1).unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].0, "Subject");
        assert_eq!(headers[0].1, "This is a long subject line");
    }

    #[test]
    fn test_repeated_names_keep_order() {
        let map = parse_header_block(b"Cc: a@x.com\nTo: t@x.com\nCc: b@x.com\n", 2).unwrap();
        assert_eq!(map.get_all("Cc"), ["a@x.com", "b@x.com"]);
        assert_eq!(map.joined("To"), "t@x.com");
    }

    #[test]
    fn test_keys_canonicalized() {
        let map = parse_header_block(b"CC: a@x.com\nsubject: hi\r\n", 2).unwrap();
        assert_eq!(map.joined("Cc"), "a@x.com");
        assert_eq!(map.joined("Subject"), "hi");
    }

    #[test]
    fn test_canonical_header_key() {
        assert_eq!(canonical_header_key("message-id"), "Message-Id");
        assert_eq!(canonical_header_key("X-GMAIL-LABELS"), "X-Gmail-Labels");
        assert_eq!(canonical_header_key("Date"), "Date");
    }

    #[test]
    fn test_line_without_colon_is_error() {
        let err = parse_header_block(b"From: a@b.com\nnot a header\n", 2).unwrap_err();
        match err {
            ExtractError::MalformedHeader { line, content } => {
                assert_eq!(line, 3);
                assert_eq!(content, "not a header");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_leading_continuation_is_error() {
        assert!(parse_header_block(b"  orphan\nFrom: a@b.com\n", 2).is_err());
    }

    #[test]
    fn test_empty_value_allowed() {
        let map = parse_header_block(b"Subject:\n", 2).unwrap();
        assert_eq!(map.get_all("Subject"), [""]);
    }
}
