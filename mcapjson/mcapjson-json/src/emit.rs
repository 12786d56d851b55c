//! Conversion from the decoder's [`Value`] IR to `serde_json::Value`.

use mcapjson_core::Value;
use serde_json::{Map, Number, Value as Json};

/// Convert a decoded value tree into JSON.
///
/// Struct field order is preserved (wire order). Integers up to 64 bits
/// are emitted exactly. Non-finite floats have no JSON representation and
/// become `null`.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::I8(v) => Json::Number((*v).into()),
        Value::I16(v) => Json::Number((*v).into()),
        Value::I32(v) => Json::Number((*v).into()),
        Value::I64(v) => Json::Number((*v).into()),
        Value::U8(v) => Json::Number((*v).into()),
        Value::U16(v) => Json::Number((*v).into()),
        Value::U32(v) => Json::Number((*v).into()),
        Value::U64(v) => Json::Number((*v).into()),
        Value::F32(v) => float_to_json(f64::from(*v)),
        Value::F64(v) => float_to_json(*v),
        Value::String(s) => Json::String(s.to_string()),
        Value::Struct(fields) => {
            let mut map = Map::with_capacity(fields.len());
            for (name, v) in fields {
                map.insert(name.to_string(), value_to_json(v));
            }
            Json::Object(map)
        }
        Value::List(items) | Value::Array(items) => {
            Json::Array(items.iter().map(value_to_json).collect())
        }
    }
}

fn float_to_json(v: f64) -> Json {
    match Number::from_f64(v) {
        Some(n) => Json::Number(n),
        None => Json::Null,
    }
}
