use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One captured request. Field names are the wire format served by
/// `GET /_logs` and printed by `paylog log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Instant the request body finished arriving, ISO-8601 UTC.
    pub timestamp: String,
    pub method: String,
    /// Request target as received (path + query), unparsed.
    pub url: String,
    /// Request body decoded as UTF-8. Binary bodies decode lossily;
    /// the recorder stores whatever it got, it does not validate.
    pub body: String,
}

impl LogEntry {
    /// Build an entry stamped with the current time.
    pub fn record(method: String, url: String, body: String) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            method,
            url,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_stamps_iso8601_utc() {
        let entry = LogEntry::record("GET".into(), "/x".into(), String::new());
        assert!(entry.timestamp.ends_with('Z'), "expected Z suffix, got {}", entry.timestamp);
        // 2026-08-04T12:34:56.789Z — date and time separated by T
        assert_eq!(entry.timestamp.len(), 24);
        assert_eq!(&entry.timestamp[10..11], "T");
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let entry = LogEntry {
            timestamp: "2026-08-04T00:00:00.000Z".into(),
            method: "POST".into(),
            url: "/hook?x=1".into(),
            body: "payload".into(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "timestamp": "2026-08-04T00:00:00.000Z",
                "method": "POST",
                "url": "/hook?x=1",
                "body": "payload",
            })
        );
    }

    #[test]
    fn roundtrips_through_json() {
        let entry = LogEntry::record("PUT".into(), "/a/b".into(), "{\"k\":1}".into());
        let serialized = serde_json::to_string(&entry).unwrap();
        let deserialized: LogEntry = serde_json::from_str(&serialized).unwrap();
        assert_eq!(entry, deserialized);
    }
}
