use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use mcapjson_core::{MessageEncoding, RawRecord, Value};
use mcapjson_json::{
    OutputRecord, fallback_record, nest_under_topic, transform_record, value_to_json,
};
use pretty_assertions::assert_eq;
use serde_json::{Value as Json, json};

fn raw_record(topic: &str, payload: Vec<u8>) -> RawRecord {
    RawRecord {
        topic: topic.to_string(),
        message_type: "sensor_msgs/msg/LaserScan".to_string(),
        schema_id: 1,
        message_encoding: MessageEncoding::Cdr,
        payload,
        timestamp_ns: 1_234_567_890_123_456_789,
    }
}

#[test]
fn decoded_record_serializes_without_error_fields() {
    let raw = raw_record("/scan", vec![]);
    let value = Value::Struct(vec![
        (Arc::from("range_min"), Value::F32(0.5)),
        (Arc::from("count"), Value::U32(7)),
    ]);
    let record = OutputRecord::decoded(&raw, &value);

    let json: Json = serde_json::to_value(&record).unwrap();
    let obj = json.as_object().unwrap();
    assert_eq!(
        obj.keys().collect::<Vec<_>>(),
        ["topic", "timestamp", "message_type", "data"]
    );
    assert_eq!(obj["topic"], json!("/scan"));
    assert_eq!(obj["timestamp"], json!(1_234_567_890_123_456_789u64));
    assert_eq!(obj["data"]["count"], json!(7));
}

#[test]
fn fallback_record_carries_base64_payload_and_reason() {
    let payload = vec![0x00, 0x01, 0xff, 0xfe];
    let raw = raw_record("/scan", payload.clone());
    let record = fallback_record(&raw, "buffer_overrun");

    assert!(record.is_fallback());
    let json: Json = serde_json::to_value(&record).unwrap();
    let obj = json.as_object().unwrap();
    assert_eq!(
        obj.keys().collect::<Vec<_>>(),
        [
            "topic",
            "timestamp",
            "message_type",
            "data",
            "encoding",
            "decode_error"
        ]
    );
    assert_eq!(obj["encoding"], json!("cdr"));
    assert_eq!(obj["decode_error"], json!("buffer_overrun"));

    let encoded = obj["data"]["raw_data"].as_str().unwrap();
    assert_eq!(STANDARD.decode(encoded).unwrap(), payload);
    assert_eq!(obj["data"].as_object().unwrap().len(), 1);
}

#[test]
fn fallback_of_empty_payload_is_empty_string() {
    let raw = raw_record("/scan", vec![]);
    let record = fallback_record(&raw, "schema_unresolved");
    let json: Json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["data"]["raw_data"], json!(""));
}

#[test]
fn nesting_wraps_one_object_per_segment() {
    let nested = nest_under_topic("/a/b/c", json!({"x": 1}));
    assert_eq!(nested, json!({"a": {"b": {"c": {"x": 1}}}}));
}

#[test]
fn nesting_ignores_empty_segments() {
    let nested = nest_under_topic("//a//b/", json!(42));
    assert_eq!(nested, json!({"a": {"b": 42}}));
}

#[test]
fn nesting_of_empty_topic_is_identity() {
    assert_eq!(nest_under_topic("", json!({"x": 1})), json!({"x": 1}));
}

#[test]
fn transform_converts_timestamp_and_nests_data() {
    let raw = raw_record("/scan", vec![]);
    let value = Value::Struct(vec![(Arc::from("ranges"), Value::List(vec![]))]);
    let record = transform_record(OutputRecord::decoded(&raw, &value));

    let json: Json = serde_json::to_value(&record).unwrap();
    let seconds = json["timestamp"].as_f64().unwrap();
    assert!((seconds - 1_234_567_890.123_456_789).abs() < 1e-3);
    assert_eq!(json["data"], json!({"scan": {"ranges": []}}));
}

#[test]
fn transform_preserves_fallback_fields() {
    let raw = raw_record("/sensor/data", vec![0xde, 0xad]);
    let record = transform_record(fallback_record(&raw, "invalid_utf8"));

    let json: Json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["decode_error"], json!("invalid_utf8"));
    assert!(json["data"]["sensor"]["data"]["raw_data"].is_string());
}

#[test]
fn jsonl_line_is_single_line() {
    let raw = raw_record("/scan", vec![]);
    let value = Value::Struct(vec![(
        Arc::from("name"),
        Value::String(Arc::from("line\none")),
    )]);
    let record = OutputRecord::decoded(&raw, &value);
    let line = serde_json::to_string(&record).unwrap();
    assert!(!line.contains('\n'));
}

#[test]
fn value_to_json_keeps_sequence_and_array_shape() {
    let v = Value::Struct(vec![
        (
            Arc::from("seq"),
            Value::List(vec![Value::I32(1), Value::I32(2)]),
        ),
        (
            Arc::from("arr"),
            Value::Array(vec![Value::U8(9), Value::U8(8)]),
        ),
    ]);
    assert_eq!(value_to_json(&v), json!({"seq": [1, 2], "arr": [9, 8]}));
}
