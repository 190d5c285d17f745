//! The JSON output unit.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Serialize, Serializer};

use super::message::MailboxMessage;
use crate::error::Result;
use crate::parser::date::parse_date;

/// One extracted email, serialized with fixed field names and order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailRecord {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "To")]
    pub to: String,
    #[serde(rename = "CC")]
    pub cc: String,
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "Timestamp", serialize_with = "serialize_rfc3339")]
    pub timestamp: DateTime<FixedOffset>,
}

impl EmailRecord {
    /// Project a parsed message into an output record.
    ///
    /// Fails if the `Date` header matches none of the accepted layouts.
    pub fn from_message(message: &MailboxMessage) -> Result<Self> {
        let headers = &message.headers;
        let timestamp = parse_date(&headers.joined("Date"))?;
        Ok(Self {
            from: headers.joined("From"),
            to: headers.joined("To"),
            cc: headers.joined("Cc"),
            subject: headers.joined("Subject"),
            body: String::from_utf8_lossy(&message.body).into_owned(),
            timestamp,
        })
    }
}

/// RFC 3339 with the original offset, `Z` for UTC, fraction only when non-zero.
fn serialize_rfc3339<S: Serializer>(
    dt: &DateTime<FixedOffset>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::message::HeaderMap;

    fn message(headers: &[(&str, &str)], body: &[u8]) -> MailboxMessage {
        let mut map = HeaderMap::new();
        for (k, v) in headers {
            map.append(*k, *v);
        }
        MailboxMessage {
            headers: map,
            body: body.to_vec(),
        }
    }

    #[test]
    fn test_json_shape_and_order() {
        let msg = message(
            &[
                ("From", "x@y.com"),
                ("Date", "Mon, 2 Jan 2006 15:04:05 -0700"),
            ],
            b"hi",
        );
        let record = EmailRecord::from_message(&msg).unwrap();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"From":"x@y.com","To":"","CC":"","Subject":"","Body":"hi","Timestamp":"2006-01-02T15:04:05-07:00"}"#
        );
    }

    #[test]
    fn test_utc_timestamp_uses_z() {
        let msg = message(&[("Date", "Mon, 2 Jan 2006 15:04:05 GMT")], b"");
        let record = EmailRecord::from_message(&msg).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Timestamp"], "2006-01-02T15:04:05Z");
    }

    #[test]
    fn test_repeated_cc_joined() {
        let msg = message(
            &[
                ("Cc", "a@x.com"),
                ("Cc", "b@x.com"),
                ("Date", "Mon, 2 Jan 2006 15:04:05 -0700"),
            ],
            b"",
        );
        let record = EmailRecord::from_message(&msg).unwrap();
        assert_eq!(record.cc, "a@x.com, b@x.com");
        assert_eq!(record.subject, "");
    }

    #[test]
    fn test_invalid_body_bytes_replaced() {
        let msg = message(
            &[("Date", "Mon, 2 Jan 2006 15:04:05 -0700")],
            b"caf\xe9",
        );
        let record = EmailRecord::from_message(&msg).unwrap();
        assert_eq!(record.body, "caf\u{FFFD}");
    }

    #[test]
    fn test_missing_date_fails() {
        let msg = message(&[("From", "x@y.com")], b"hi");
        assert!(EmailRecord::from_message(&msg).is_err());
    }
}
