//! Per-run schema registry: resolve-or-build-once decoder cache plus
//! topic counters.
//!
//! The registry is the only shared mutable state in a conversion run.
//! Building a decoder happens at most once per schema id; a failed build
//! is cached too, so repeated records of a broken schema cost one lookup.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use mcapjson_core::{
    EncodingKey, MessageDecoder, MessageEncoding, SchemaEncoding, SchemaError, TopicDecoder,
};
use parking_lot::Mutex;

/// One row of the topic listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicEntry {
    pub topic: String,
    pub message_type: String,
    pub count: u64,
}

/// Topic listing, ordered alphabetically by topic name.
#[derive(Debug, Clone, Default)]
pub struct TopicListing {
    pub entries: Vec<TopicEntry>,
    pub total: u64,
}

/// One schema as seen during a run, with its original source text.
#[derive(Debug, Clone)]
pub struct SchemaInfo {
    pub schema_id: u16,
    pub name: String,
    pub encoding: SchemaEncoding,
    /// Topics that carried this schema, alphabetical.
    pub topics: Vec<String>,
    /// The schema source text as stored in the bag.
    pub text: Arc<str>,
    /// Whether a decoder was successfully built for it.
    pub resolved: bool,
}

struct SchemaEntry {
    name: String,
    encoding: SchemaEncoding,
    text: Arc<str>,
    decoder: Result<Arc<dyn TopicDecoder>, SchemaError>,
    topics: BTreeSet<String>,
}

#[derive(Default)]
struct RegistryState {
    schemas: HashMap<u16, SchemaEntry>,
    topics: BTreeMap<String, (String, u64)>,
}

/// Decoder cache and per-topic counters, scoped to one conversion run.
pub struct SchemaRegistry {
    decoders: HashMap<EncodingKey, Arc<dyn MessageDecoder>>,
    state: Mutex<RegistryState>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Register a decoder factory for its encoding pair.
    pub fn register_decoder(&mut self, decoder: Arc<dyn MessageDecoder>) {
        self.decoders.insert(decoder.encoding_key(), decoder);
    }

    /// Return the cached decoder for a schema id, building it on first use.
    ///
    /// A build failure is cached like a success; later calls for the same
    /// id return the same error without re-parsing the schema.
    pub fn resolve(
        &self,
        schema_id: u16,
        schema_name: &str,
        schema_encoding: &SchemaEncoding,
        message_encoding: &MessageEncoding,
        schema_data: &[u8],
        topic: &str,
    ) -> Result<Arc<dyn TopicDecoder>, SchemaError> {
        let mut state = self.state.lock();
        if let Some(entry) = state.schemas.get_mut(&schema_id) {
            entry.topics.insert(topic.to_string());
            return entry.decoder.clone();
        }

        let decoder = self
            .build_decoder(schema_name, schema_encoding, message_encoding, schema_data)
            .inspect_err(|e| {
                tracing::debug!(
                    schema = schema_name,
                    schema_id,
                    error = %e,
                    "schema resolution failed"
                );
            });
        let entry = SchemaEntry {
            name: schema_name.to_string(),
            encoding: schema_encoding.clone(),
            text: Arc::from(String::from_utf8_lossy(schema_data).into_owned()),
            decoder: decoder.clone(),
            topics: BTreeSet::from([topic.to_string()]),
        };
        state.schemas.insert(schema_id, entry);
        decoder
    }

    fn build_decoder(
        &self,
        schema_name: &str,
        schema_encoding: &SchemaEncoding,
        message_encoding: &MessageEncoding,
        schema_data: &[u8],
    ) -> Result<Arc<dyn TopicDecoder>, SchemaError> {
        let key = EncodingKey::new(schema_encoding.clone(), message_encoding.clone());
        let factory = self
            .decoders
            .get(&key)
            .ok_or_else(|| SchemaError::Unsupported {
                schema_name: schema_name.to_string(),
                construct: format!(
                    "encoding pair '{schema_encoding}'/'{message_encoding}'"
                ),
            })?;
        let decoder = factory.build_topic_decoder(schema_name, schema_data)?;
        Ok(Arc::from(decoder))
    }

    /// Count one message for a topic.
    pub fn record_message(&self, topic: &str, message_type: &str) {
        let mut state = self.state.lock();
        state
            .topics
            .entry(topic.to_string())
            .or_insert_with(|| (message_type.to_string(), 0))
            .1 += 1;
    }

    /// Topic listing accumulated so far, alphabetical, with the total count.
    pub fn topics(&self) -> TopicListing {
        let state = self.state.lock();
        let entries: Vec<TopicEntry> = state
            .topics
            .iter()
            .map(|(topic, (message_type, count))| TopicEntry {
                topic: topic.clone(),
                message_type: message_type.clone(),
                count: *count,
            })
            .collect();
        let total = entries.iter().map(|e| e.count).sum();
        TopicListing { entries, total }
    }

    /// Schemas seen so far, ordered by schema id.
    pub fn schemas(&self) -> Vec<SchemaInfo> {
        let state = self.state.lock();
        let mut infos: Vec<SchemaInfo> = state
            .schemas
            .iter()
            .map(|(id, entry)| SchemaInfo {
                schema_id: *id,
                name: entry.name.clone(),
                encoding: entry.encoding.clone(),
                topics: entry.topics.iter().cloned().collect(),
                text: Arc::clone(&entry.text),
                resolved: entry.decoder.is_ok(),
            })
            .collect();
        infos.sort_by_key(|info| info.schema_id);
        infos
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
