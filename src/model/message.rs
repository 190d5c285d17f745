//! A single message as it comes out of a mailbox stream.

use std::collections::HashMap;

/// Multi-valued header mapping.
///
/// Keys are canonical MIME header names (`Cc`, `Message-Id`); each key maps
/// to its values in arrival order, since a header may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    inner: HashMap<String, Vec<String>>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under an already-canonical key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.entry(key.into()).or_default().push(value.into());
    }

    /// All values for `key` (exact match), empty if absent.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.inner.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All values for `key` joined with `", "`; empty string if absent.
    pub fn joined(&self, key: &str) -> String {
        self.get_all(key).join(", ")
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// One email extracted from a mailbox: headers plus the raw body bytes.
#[derive(Debug, Clone, Default)]
pub struct MailboxMessage {
    /// Parsed header block.
    pub headers: HeaderMap,
    /// Everything after the header block, framing removed.
    pub body: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_repeated_header() {
        let mut headers = HeaderMap::new();
        headers.append("Cc", "a@x.com");
        headers.append("Cc", "b@x.com");
        assert_eq!(headers.joined("Cc"), "a@x.com, b@x.com");
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_missing_header_is_empty() {
        let headers = HeaderMap::new();
        assert!(headers.get_all("Subject").is_empty());
        assert_eq!(headers.joined("Subject"), "");
    }

    #[test]
    fn test_lookup_is_exact() {
        let mut headers = HeaderMap::new();
        headers.append("Cc", "a@x.com");
        assert_eq!(headers.joined("CC"), "");
    }
}
