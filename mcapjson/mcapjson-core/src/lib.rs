//! Encoding-agnostic core types and decoder contracts for `mcapjson`.
//!
//! This crate provides the JSON-independent intermediate representation
//! ([`Value`]), the error taxonomy ([`SchemaError`] / [`DecodeError`]), and
//! the [`MessageDecoder`] trait implemented by schema-format decoders.

mod decoder;
mod encoding;
mod error;
mod record;
mod value;

pub use decoder::{EncodingKey, MessageDecoder, TopicDecoder};
pub use encoding::{MessageEncoding, SchemaEncoding};
pub use error::{DecodeError, SchemaError};
pub use record::RawRecord;
pub use value::Value;
