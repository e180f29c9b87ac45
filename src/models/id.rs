//! Document identifiers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use ulid::Ulid;

use crate::error::AppError;

/// Unique identifier of a document within its collection.
///
/// Generated client-side as a ULID, so ids sort by creation time. Stored as
/// the 26-character Crockford base32 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(Ulid);

impl DocumentId {
    /// Generates a new identifier.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Time component of the identifier.
    pub fn timestamp(&self) -> DateTime<Utc> {
        let millis = i64::try_from(self.0.timestamp_ms()).unwrap_or(i64::MAX);
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or_default()
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DocumentId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self).map_err(|e| AppError::InvalidId {
            value: s.to_string(),
            reason: e.to_string(),
        })
    }
}

impl From<Ulid> for DocumentId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

impl From<DocumentId> for JsonValue {
    fn from(id: DocumentId) -> Self {
        JsonValue::String(id.to_string())
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_display() {
        let id = DocumentId::new();
        let parsed: DocumentId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = "not-an-id".parse::<DocumentId>().unwrap_err();
        assert!(matches!(err, AppError::InvalidId { .. }));
    }

    #[test]
    fn test_serializes_as_string() {
        let id = DocumentId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, JsonValue::String(id.to_string()));
    }

    #[test]
    fn test_deserialize_invalid_is_error() {
        let result: Result<DocumentId, _> = serde_json::from_str("\"zzz\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_ids_are_unique_and_recent() {
        let a = DocumentId::new();
        let b = DocumentId::new();
        assert_ne!(a, b);
        let age = Utc::now() - a.timestamp();
        assert!(age.num_seconds() < 60);
    }
}
