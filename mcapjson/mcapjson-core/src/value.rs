//! Type-safe intermediate representation produced by message decoders.

use std::sync::Arc;

/// Value produced by message decoders.
///
/// All widths are explicit; no lossy conversions happen before emission.
/// 64-bit integers are carried exactly — any narrowing is the concern of
/// the output layer, not the decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(Arc<str>),
    /// Struct fields carry their names in declaration (= wire) order.
    Struct(Vec<(Arc<str>, Value)>),
    /// Variable-length sequence (`sequence<T>`).
    List(Vec<Value>),
    /// Fixed-length array (`T name[N]`).
    Array(Vec<Value>),
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Self::String(Arc::from(s.as_ref()))
    }

    /// Field values of a struct, or `None` for any other variant.
    pub fn as_struct(&self) -> Option<&[(Arc<str>, Value)]> {
        match self {
            Value::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Look up a struct field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_struct()?
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, v)| v)
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::I8(_) => "I8",
            Value::I16(_) => "I16",
            Value::I32(_) => "I32",
            Value::I64(_) => "I64",
            Value::U8(_) => "U8",
            Value::U16(_) => "U16",
            Value::U32(_) => "U32",
            Value::U64(_) => "U64",
            Value::F32(_) => "F32",
            Value::F64(_) => "F64",
            Value::String(_) => "String",
            Value::Struct(_) => "Struct",
            Value::List(_) => "List",
            Value::Array(_) => "Array",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_lookup_finds_named_field() {
        let v = Value::Struct(vec![
            (Arc::from("x"), Value::I32(1)),
            (Arc::from("y"), Value::I32(2)),
        ]);
        assert_eq!(v.field("y"), Some(&Value::I32(2)));
        assert_eq!(v.field("z"), None);
    }

    #[test]
    fn field_lookup_on_non_struct_is_none() {
        assert_eq!(Value::I32(1).field("x"), None);
    }
}
