//! Degraded records for payloads that could not be decoded.

use base64::{Engine, engine::general_purpose::STANDARD};
use mcapjson_core::RawRecord;
use serde_json::{Value as Json, json};

use crate::record::{OutputRecord, Timestamp};

/// Encode raw payload bytes as the fallback `data` object.
///
/// Base64 of arbitrary bytes cannot fail; this path never errors.
pub fn fallback_data(payload: &[u8]) -> Json {
    json!({ "raw_data": STANDARD.encode(payload) })
}

/// Build a fallback record carrying the raw bytes and the failure reason.
///
/// `reason` is one of the machine-readable tags from
/// [`mcapjson_core::DecodeError::fallback_reason`] /
/// [`mcapjson_core::SchemaError::fallback_reason`].
pub fn fallback_record(raw: &RawRecord, reason: &str) -> OutputRecord {
    OutputRecord {
        topic: raw.topic.clone(),
        timestamp: Timestamp::Nanos(raw.timestamp_ns),
        message_type: raw.message_type.clone(),
        data: fallback_data(&raw.payload),
        encoding: Some(raw.message_encoding.to_string()),
        decode_error: Some(reason.to_string()),
    }
}
