//! Error taxonomy for the schema and decode layers.
//!
//! [`SchemaError`] covers failures while building a schema model from IDL
//! text; it makes every message of that type fall back. [`DecodeError`]
//! covers failures while decoding one record's payload; it makes only that
//! record fall back. Neither is ever fatal to a conversion run.

/// Failure while parsing or resolving a schema into a decodable model.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchemaError {
    /// The schema text could not be parsed at all.
    #[error("failed to parse schema '{schema_name}': {detail}")]
    Parse { schema_name: String, detail: String },

    /// A field references a type that is not defined in the schema text.
    #[error("unresolved type '{type_name}' in schema '{schema_name}'")]
    UnknownType {
        schema_name: String,
        type_name: String,
    },

    /// The schema uses an IDL construct the decoder cannot drive.
    #[error("unsupported construct in schema '{schema_name}': {construct}")]
    Unsupported {
        schema_name: String,
        construct: String,
    },
}

impl SchemaError {
    /// Machine-readable reason tag carried by fallback records.
    pub fn fallback_reason(&self) -> &'static str {
        match self {
            SchemaError::Parse { .. } | SchemaError::UnknownType { .. } => "schema_unresolved",
            SchemaError::Unsupported { .. } => "unsupported_type",
        }
    }
}

/// Failure while decoding a single CDR payload against a schema model.
///
/// Every variant aborts the whole record; the decoder never emits a
/// partially populated tree.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DecodeError {
    /// A read would run past the end of the payload.
    #[error("buffer overrun at {path}: need {needed} bytes, {remaining} remaining")]
    BufferOverrun {
        path: String,
        needed: usize,
        remaining: usize,
    },

    /// A sequence or string length prefix larger than the remaining payload.
    #[error("implausible length {len} at {path}: only {remaining} bytes remain")]
    ImplausibleLength {
        path: String,
        len: usize,
        remaining: usize,
    },

    /// String bytes are not valid UTF-8.
    #[error("invalid UTF-8 at {path}: {detail}")]
    InvalidUtf8 { path: String, detail: String },

    /// The payload is shorter than the 4-byte encapsulation header.
    #[error("incomplete CDR encapsulation header")]
    TruncatedHeader,

    /// The encapsulation header names a representation the decoder does not handle.
    #[error("unsupported CDR representation identifier: 0x{id:04x}")]
    UnsupportedRepresentation { id: u16 },

    /// A nested struct reference is missing from the schema model.
    #[error("unknown struct '{name}' at {path}")]
    UnknownStruct { path: String, name: String },

    /// A field type the decoder cannot read (e.g. wide strings).
    #[error("unsupported type at {path}: {detail}")]
    UnsupportedType { path: String, detail: String },

    /// Struct nesting exceeded the recursion guard.
    #[error("schema nesting deeper than {limit} at {path}")]
    DepthExceeded { path: String, limit: usize },
}

impl DecodeError {
    /// Machine-readable reason tag carried by fallback records.
    pub fn fallback_reason(&self) -> &'static str {
        match self {
            DecodeError::BufferOverrun { .. }
            | DecodeError::ImplausibleLength { .. }
            | DecodeError::TruncatedHeader => "buffer_overrun",
            DecodeError::InvalidUtf8 { .. } => "invalid_utf8",
            DecodeError::UnknownStruct { .. } => "schema_unresolved",
            DecodeError::UnsupportedRepresentation { .. }
            | DecodeError::UnsupportedType { .. }
            | DecodeError::DepthExceeded { .. } => "unsupported_type",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_reasons_are_stable() {
        let e = DecodeError::BufferOverrun {
            path: "a.b".into(),
            needed: 4,
            remaining: 1,
        };
        assert_eq!(e.fallback_reason(), "buffer_overrun");

        let e = DecodeError::InvalidUtf8 {
            path: "a".into(),
            detail: "bad byte".into(),
        };
        assert_eq!(e.fallback_reason(), "invalid_utf8");

        let e = SchemaError::UnknownType {
            schema_name: "ex/msg/A".into(),
            type_name: "Missing".into(),
        };
        assert_eq!(e.fallback_reason(), "schema_unresolved");
    }
}
