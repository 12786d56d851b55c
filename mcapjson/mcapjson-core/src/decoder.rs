//! Decoder traits and encoding key used to register pluggable message decoders.

use crate::{
    encoding::{MessageEncoding, SchemaEncoding},
    error::{DecodeError, SchemaError},
    value::Value,
};

/// Key identifying a (schema_encoding, message_encoding) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodingKey {
    pub schema_encoding: SchemaEncoding,
    pub message_encoding: MessageEncoding,
}

impl EncodingKey {
    pub fn new(schema_encoding: SchemaEncoding, message_encoding: MessageEncoding) -> Self {
        Self {
            schema_encoding,
            message_encoding,
        }
    }
}

/// Schema-local decoder built once per schema id and reused for every
/// message carrying that schema.
pub trait TopicDecoder: Send + Sync {
    /// Decode a single message payload into a [`Value`] tree.
    fn decode(&self, payload: &[u8]) -> Result<Value, DecodeError>;
}

/// Factory trait that builds schema-local decoders from schema metadata.
///
/// Implementations are registered with the schema registry and dispatched
/// on [`EncodingKey`].
pub trait MessageDecoder: Send + Sync {
    /// Returns the encoding pair this decoder handles.
    fn encoding_key(&self) -> EncodingKey;

    /// Build a schema-local decoder for the given schema text.
    ///
    /// Returns `Err` if the schema cannot be parsed or resolved; the caller
    /// records the failure so the parse is never re-attempted.
    fn build_topic_decoder(
        &self,
        schema_name: &str,
        schema_data: &[u8],
    ) -> Result<Box<dyn TopicDecoder>, SchemaError>;
}
