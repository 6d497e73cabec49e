//! Application logs - one immutable record per autofill attempt

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page size used when the caller does not pass `limit`
pub const DEFAULT_LOG_LIMIT: u64 = 50;

/// Request body for recording an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApplicationLog {
    pub url: String,
    pub platform: String,
    pub fields_filled: Vec<String>,
    pub fields_failed: Vec<String>,
    #[serde(default)]
    pub resume_uploaded: bool,
}

/// A persisted attempt.
///
/// `resume_uploaded` goes over the wire as `0`/`1`, the same way it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationLog {
    pub id: i64,
    pub url: String,
    pub platform: String,
    pub fields_filled: Vec<String>,
    pub fields_failed: Vec<String>,
    #[serde(with = "flag")]
    pub resume_uploaded: bool,
    pub created_at: DateTime<Utc>,
}

/// `bool` <-> `0`/`1`
pub(crate) mod flag {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(D::Error::custom(format!("expected 0 or 1, got {other}"))),
        }
    }

    pub fn to_int(value: bool) -> i64 {
        i64::from(value)
    }

    pub fn from_int(value: i64) -> bool {
        value != 0
    }
}
