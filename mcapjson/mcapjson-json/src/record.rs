//! Output record model: the one-JSON-object-per-line interface.

use mcapjson_core::{RawRecord, Value};
use serde::Serialize;

use crate::emit::value_to_json;

/// Record timestamp, either in source units (nanoseconds) or converted to
/// seconds by the record transformer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Timestamp {
    Nanos(u64),
    Seconds(f64),
}

/// One output record.
///
/// Exactly one of these shapes holds:
/// - decoded: `data` is the full decoded tree, `encoding` and
///   `decode_error` absent;
/// - fallback: `data` is `{"raw_data": <base64>}` with both `encoding` and
///   `decode_error` present.
#[derive(Debug, Clone, Serialize)]
pub struct OutputRecord {
    pub topic: String,
    pub timestamp: Timestamp,
    pub message_type: String,
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
}

impl OutputRecord {
    /// Build a record from a successful decode.
    pub fn decoded(raw: &RawRecord, value: &Value) -> Self {
        Self {
            topic: raw.topic.clone(),
            timestamp: Timestamp::Nanos(raw.timestamp_ns),
            message_type: raw.message_type.clone(),
            data: value_to_json(value),
            encoding: None,
            decode_error: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.decode_error.is_some()
    }
}
