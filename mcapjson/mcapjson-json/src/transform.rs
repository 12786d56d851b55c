//! Post-decode reshaping applied before records are re-streamed.
//!
//! Two pure transforms: nanosecond→second timestamp conversion and nesting
//! of `data` under the topic's slash-delimited path segments.

use serde_json::{Map, Value as Json};

use crate::record::{OutputRecord, Timestamp};

/// Convert a nanosecond timestamp to seconds.
///
/// The result is `ns / 1e9` as an IEEE-754 double. For current epoch
/// timestamps the double's 52-bit mantissa cannot carry all nine
/// fractional digits, so the least-significant nanoseconds may round; the
/// formula itself is the contract, not exact round-tripping.
pub fn timestamp_to_seconds(ns: u64) -> f64 {
    ns as f64 / 1e9
}

/// Nest `data` under the topic's path segments.
///
/// `/sensor/data` wraps the value as `{"sensor": {"data": <value>}}`; one
/// object wrapper per segment, outermost first. Empty segments (leading
/// slash, doubled slashes) are dropped. An empty path returns the value
/// unchanged. Keys inside the value are untouched.
pub fn nest_under_topic(topic: &str, data: Json) -> Json {
    let mut nested = data;
    for segment in topic.split('/').filter(|s| !s.is_empty()).rev() {
        let mut wrapper = Map::with_capacity(1);
        wrapper.insert(segment.to_string(), nested);
        nested = Json::Object(wrapper);
    }
    nested
}

/// Reshape one record for re-streaming: timestamp in seconds, `data`
/// nested under the topic path. Everything else is left as-is.
pub fn transform_record(record: OutputRecord) -> OutputRecord {
    let seconds = match record.timestamp {
        Timestamp::Nanos(ns) => timestamp_to_seconds(ns),
        Timestamp::Seconds(s) => s,
    };
    OutputRecord {
        timestamp: Timestamp::Seconds(seconds),
        data: nest_under_topic(&record.topic, record.data),
        ..record
    }
}
