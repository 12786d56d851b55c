use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use mcapjson_core::{DecodeError, Value};
use mcapjson_ros2_common::{
    PrimitiveType, ResolvedField, ResolvedSchema, ResolvedStruct, ResolvedType, decode_cdr_to_value,
};

// ── helpers ──────────────────────────────────────────────────────────────────

/// Pad `buf` to the next `n`-byte boundary.
fn align(buf: &mut Vec<u8>, n: usize) {
    let pad = (n - (buf.len() % n)) % n;
    for _ in 0..pad {
        buf.push(0);
    }
}

fn field(name: &str, ty: ResolvedType) -> ResolvedField {
    ResolvedField {
        name: Arc::from(name),
        ty,
        fixed_len: None,
    }
}

fn prim(p: PrimitiveType) -> ResolvedType {
    ResolvedType::Primitive(p)
}

/// Build a one-struct schema with the given fields.
fn make_schema(fields: Vec<ResolvedField>) -> ResolvedSchema {
    let root = vec!["ex".to_string(), "msg".to_string(), "A".to_string()];
    let mut structs = HashMap::new();
    structs.insert(root.clone(), ResolvedStruct { fields });
    ResolvedSchema {
        root,
        structs,
        enums: HashSet::new(),
    }
}

/// Build a minimal CDR buffer: 4-byte little-endian encapsulation header + payload.
fn cdr_le(payload: Vec<u8>) -> Vec<u8> {
    let mut buf = vec![0x00, 0x01, 0x00, 0x00];
    buf.extend(payload);
    buf
}

fn expect_struct(value: Value) -> Vec<(Arc<str>, Value)> {
    match value {
        Value::Struct(fields) => fields,
        other => panic!("expected struct, got {}", other.variant_name()),
    }
}

// ── shape and scenarios ──────────────────────────────────────────────────────

/// `struct P { int32 x; int32 y; }` over 8 little-endian bytes yields
/// `{x: 1, y: 2}` with names in wire order.
#[test]
fn decodes_two_int32_fields_in_wire_order() {
    let schema = make_schema(vec![
        field("x", prim(PrimitiveType::I32)),
        field("y", prim(PrimitiveType::I32)),
    ]);

    let mut payload = Vec::new();
    payload.extend_from_slice(&1i32.to_le_bytes());
    payload.extend_from_slice(&2i32.to_le_bytes());

    let fields = expect_struct(decode_cdr_to_value(&schema, &cdr_le(payload)).expect("decode"));
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].0.as_ref(), "x");
    assert_eq!(fields[0].1, Value::I32(1));
    assert_eq!(fields[1].0.as_ref(), "y");
    assert_eq!(fields[1].1, Value::I32(2));
}

/// A `sequence<float32>` with prefix 3 followed by 12 bytes decodes to
/// exactly three float elements.
#[test]
fn decodes_float32_sequence_of_three() {
    let schema = make_schema(vec![field(
        "ranges",
        ResolvedType::Sequence {
            elem: Box::new(prim(PrimitiveType::F32)),
        },
    )]);

    let mut payload = Vec::new();
    payload.extend_from_slice(&3u32.to_le_bytes());
    for v in [1.0f32, 2.5, -4.0] {
        payload.extend_from_slice(&v.to_le_bytes());
    }

    let fields = expect_struct(decode_cdr_to_value(&schema, &cdr_le(payload)).expect("decode"));
    let Value::List(elems) = &fields[0].1 else {
        panic!("expected list");
    };
    assert_eq!(
        elems,
        &vec![Value::F32(1.0), Value::F32(2.5), Value::F32(-4.0)]
    );
}

#[test]
fn decodes_f64_with_encapsulation_relative_alignment() {
    let schema = make_schema(vec![
        field("flag", prim(PrimitiveType::U8)),
        field("value", prim(PrimitiveType::F64)),
    ]);

    let mut payload = vec![7u8];
    // f64 aligns to 8 relative to the payload start, not the buffer start.
    payload.extend_from_slice(&[0; 7]);
    payload.extend_from_slice(&(1.25f64).to_le_bytes());

    let fields = expect_struct(decode_cdr_to_value(&schema, &cdr_le(payload)).expect("decode"));
    assert_eq!(fields[0].1, Value::U8(7));
    assert_eq!(fields[1].1, Value::F64(1.25));
}

#[test]
fn decodes_bool_and_char_fields() {
    let schema = make_schema(vec![
        field("a", prim(PrimitiveType::Bool)),
        field("b", prim(PrimitiveType::Bool)),
        field("c", prim(PrimitiveType::Char)),
    ]);

    let cdr = cdr_le(vec![0x00, 0x01, b'Z']);
    let fields = expect_struct(decode_cdr_to_value(&schema, &cdr).expect("decode"));
    assert_eq!(fields[0].1, Value::Bool(false));
    assert_eq!(fields[1].1, Value::Bool(true));
    assert_eq!(fields[2].1, Value::string("Z"));
}

/// A fixed-length array field (`fixed_len = Some(3)`) produces `Value::Array`
/// with no length prefix consumed.
#[test]
fn decodes_fixed_length_array() {
    let schema = make_schema(vec![ResolvedField {
        name: Arc::from("coords"),
        ty: prim(PrimitiveType::I32),
        fixed_len: Some(3),
    }]);

    let mut payload = Vec::new();
    for v in [10i32, 20, 30] {
        payload.extend_from_slice(&v.to_le_bytes());
    }

    let fields = expect_struct(decode_cdr_to_value(&schema, &cdr_le(payload)).expect("decode"));
    let Value::Array(elems) = &fields[0].1 else {
        panic!("expected array");
    };
    assert_eq!(
        elems,
        &vec![Value::I32(10), Value::I32(20), Value::I32(30)]
    );
}

/// A nested struct field decodes recursively; nesting itself adds no
/// alignment beyond the first field's natural alignment.
#[test]
fn decodes_nested_struct() {
    let inner_name = vec!["ex".to_string(), "msg".to_string(), "Inner".to_string()];
    let root_name = vec!["ex".to_string(), "msg".to_string(), "Root".to_string()];

    let mut structs = HashMap::new();
    structs.insert(
        inner_name.clone(),
        ResolvedStruct {
            fields: vec![
                field("x", prim(PrimitiveType::U32)),
                field("y", prim(PrimitiveType::U32)),
            ],
        },
    );
    structs.insert(
        root_name.clone(),
        ResolvedStruct {
            fields: vec![field("inner", ResolvedType::Struct(inner_name))],
        },
    );
    let schema = ResolvedSchema {
        root: root_name,
        structs,
        enums: HashSet::new(),
    };

    let mut payload = Vec::new();
    payload.extend_from_slice(&42u32.to_le_bytes());
    payload.extend_from_slice(&99u32.to_le_bytes());

    let fields = expect_struct(decode_cdr_to_value(&schema, &cdr_le(payload)).expect("decode"));
    let inner = expect_struct(fields[0].1.clone());
    assert_eq!(inner[0].1, Value::U32(42));
    assert_eq!(inner[1].1, Value::U32(99));
}

/// Enums are 32-bit on the wire and decode as their raw integer value.
#[test]
fn decodes_enum_as_integer() {
    let enum_name = vec!["ex".to_string(), "msg".to_string(), "State".to_string()];
    let mut schema = make_schema(vec![field("state", ResolvedType::Enum(enum_name.clone()))]);
    schema.enums.insert(enum_name);

    let payload = 5u32.to_le_bytes().to_vec();
    let fields = expect_struct(decode_cdr_to_value(&schema, &cdr_le(payload)).expect("decode"));
    assert_eq!(fields[0].1, Value::U32(5));
}

// ── strings ──────────────────────────────────────────────────────────────────

/// The length prefix includes the NUL terminator, which is stripped.
#[test]
fn decodes_string_with_null_terminator() {
    let schema = make_schema(vec![field("label", prim(PrimitiveType::String))]);

    let s = b"hello\0";
    let mut payload = Vec::new();
    payload.extend_from_slice(&(s.len() as u32).to_le_bytes());
    payload.extend_from_slice(s);

    let fields = expect_struct(decode_cdr_to_value(&schema, &cdr_le(payload)).expect("decode"));
    assert_eq!(fields[0].1, Value::string("hello"));
}

/// A string without a trailing NUL is tolerated; all bytes are content.
#[test]
fn decodes_string_without_null_terminator() {
    let schema = make_schema(vec![field("label", prim(PrimitiveType::String))]);

    let mut payload = Vec::new();
    payload.extend_from_slice(&2u32.to_le_bytes());
    payload.extend_from_slice(b"ab");

    let fields = expect_struct(decode_cdr_to_value(&schema, &cdr_le(payload)).expect("decode"));
    assert_eq!(fields[0].1, Value::string("ab"));
}

#[test]
fn decodes_zero_length_string_as_empty() {
    let schema = make_schema(vec![field("label", prim(PrimitiveType::String))]);

    let payload = 0u32.to_le_bytes().to_vec();
    let fields = expect_struct(decode_cdr_to_value(&schema, &cdr_le(payload)).expect("decode"));
    assert_eq!(fields[0].1, Value::string(""));
}

#[test]
fn fails_on_invalid_utf8_in_string() {
    let schema = make_schema(vec![field("label", prim(PrimitiveType::String))]);

    let mut payload = Vec::new();
    payload.extend_from_slice(&3u32.to_le_bytes());
    payload.extend_from_slice(&[0xff, 0xfe, 0x00]);

    let err = decode_cdr_to_value(&schema, &cdr_le(payload)).expect_err("should fail");
    assert!(matches!(err, DecodeError::InvalidUtf8 { .. }));
    assert_eq!(err.fallback_reason(), "invalid_utf8");
}

// ── corruption and truncation ────────────────────────────────────────────────

/// A sequence prefix larger than the remaining payload is corruption, not
/// an attempt to read past the buffer.
#[test]
fn fails_on_implausible_sequence_length() {
    let schema = make_schema(vec![field(
        "data",
        ResolvedType::Sequence {
            elem: Box::new(prim(PrimitiveType::U8)),
        },
    )]);

    let mut payload = Vec::new();
    payload.extend_from_slice(&1_000_000u32.to_le_bytes());
    payload.extend_from_slice(&[1, 2]);

    let err = decode_cdr_to_value(&schema, &cdr_le(payload)).expect_err("should fail");
    assert!(matches!(
        err,
        DecodeError::ImplausibleLength { len: 1_000_000, .. }
    ));
    assert_eq!(err.fallback_reason(), "buffer_overrun");
}

/// Any buffer shorter than the schema's minimum length fails with an
/// overrun; no partial tree is returned.
#[test]
fn fails_on_short_buffer_for_every_truncation_point() {
    let schema = make_schema(vec![
        field("x", prim(PrimitiveType::I32)),
        field("y", prim(PrimitiveType::I32)),
    ]);

    let mut full = Vec::new();
    full.extend_from_slice(&1i32.to_le_bytes());
    full.extend_from_slice(&2i32.to_le_bytes());

    for cut in 0..full.len() {
        let cdr = cdr_le(full[..cut].to_vec());
        let err = decode_cdr_to_value(&schema, &cdr).expect_err("truncated decode should fail");
        assert_eq!(err.fallback_reason(), "buffer_overrun", "cut at {cut}");
    }
}

#[test]
fn fails_on_truncated_encapsulation_header() {
    let schema = make_schema(vec![]);
    let err = decode_cdr_to_value(&schema, &[0x00, 0x01]).expect_err("should fail");
    assert!(matches!(err, DecodeError::TruncatedHeader));
}

#[test]
fn fails_on_parameter_list_representation() {
    let schema = make_schema(vec![]);
    // 0x0002 = PL_CDR_BE, not handled.
    let err = decode_cdr_to_value(&schema, &[0x00, 0x02, 0x00, 0x00]).expect_err("should fail");
    assert!(matches!(
        err,
        DecodeError::UnsupportedRepresentation { id: 0x0002 }
    ));
}

// ── endianness ───────────────────────────────────────────────────────────────

/// A big-endian representation header switches all multi-byte reads.
#[test]
fn decodes_big_endian_payload() {
    let schema = make_schema(vec![
        field("a", prim(PrimitiveType::U32)),
        field("b", prim(PrimitiveType::U16)),
    ]);

    let mut cdr = vec![0x00, 0x00, 0x00, 0x00]; // CDR_BE
    cdr.extend_from_slice(&0xDEADBEEFu32.to_be_bytes());
    cdr.extend_from_slice(&0x0102u16.to_be_bytes());

    let fields = expect_struct(decode_cdr_to_value(&schema, &cdr).expect("decode"));
    assert_eq!(fields[0].1, Value::U32(0xDEADBEEF));
    assert_eq!(fields[1].1, Value::U16(0x0102));
}

// ── alignment after variable-length fields ───────────────────────────────────

/// Alignment stays correct after a string moves the cursor off-boundary.
#[test]
fn aligns_correctly_after_string() {
    let schema = make_schema(vec![
        field("name", prim(PrimitiveType::String)),
        field("value", prim(PrimitiveType::U32)),
    ]);

    let mut payload = Vec::new();
    let s = b"ab\0";
    payload.extend_from_slice(&(s.len() as u32).to_le_bytes());
    payload.extend_from_slice(s); // payload offset now 7 → pad 1 before u32
    align(&mut payload, 4);
    payload.extend_from_slice(&77u32.to_le_bytes());

    let fields = expect_struct(decode_cdr_to_value(&schema, &cdr_le(payload)).expect("decode"));
    assert_eq!(fields[0].1, Value::string("ab"));
    assert_eq!(fields[1].1, Value::U32(77));
}
