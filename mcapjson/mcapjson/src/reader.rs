//! MCAP bag reader driving the decode pipeline.

use std::{collections::HashSet, fs, path::Path, sync::Arc};

use mcapjson_core::{MessageEncoding, RawRecord, SchemaEncoding, TopicDecoder};
use mcapjson_json::{OutputRecord, fallback_record};
use mcapjson_ros2idl::Ros2IdlDecoder;
use memmap2::Mmap;
use rayon::prelude::*;

use crate::{
    error::PipelineError,
    registry::{SchemaInfo, SchemaRegistry, TopicEntry, TopicListing},
};

/// Per-run counters reported after a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub messages: u64,
    pub decoded: u64,
    pub fallbacks: u64,
}

type RecordCallback<'a> =
    dyn FnMut(OutputRecord) -> Result<(), Box<dyn std::error::Error + Send + Sync>> + 'a;

/// Reads an MCAP bag and emits one [`OutputRecord`] per message.
///
/// Decode failures never abort a run; each failing record becomes a
/// fallback record carrying the raw bytes.
pub struct BagReader {
    registry: SchemaRegistry,
    batch_size: usize,
    topic_filter: Option<HashSet<String>>,
    record_limit: Option<u64>,
}

/// Builder for configuring [`BagReader`].
pub struct BagReaderBuilder {
    registry: SchemaRegistry,
    batch_size: usize,
    topic_filter: Option<HashSet<String>>,
    record_limit: Option<u64>,
}

impl BagReader {
    pub fn builder() -> BagReaderBuilder {
        BagReaderBuilder {
            registry: SchemaRegistry::new(),
            batch_size: 1024,
            topic_filter: None,
            record_limit: None,
        }
    }

    /// The schema registry populated by the current run.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    fn mmap_file(&self, path: &Path) -> Result<Mmap, PipelineError> {
        let file = fs::File::open(path)?;
        Ok(unsafe { Mmap::map(&file) }?)
    }

    fn read_summary(&self, path: &Path) -> Result<mcap::read::Summary, PipelineError> {
        let mmap = self.mmap_file(path)?;
        mcap::read::Summary::read(&mmap)?.ok_or_else(|| PipelineError::SummaryNotAvailable {
            path: path.display().to_string(),
        })
    }

    fn topic_selected(&self, topic: &str) -> bool {
        self.topic_filter
            .as_ref()
            .is_none_or(|filter| filter.contains(topic))
    }

    /// Stream every selected message through `callback`, in file order.
    ///
    /// Decoding runs in parallel over batches; emission order matches
    /// input order. The callback's first error aborts the run.
    pub fn for_each_record(
        &self,
        path: &Path,
        mut callback: impl FnMut(OutputRecord) -> Result<(), Box<dyn std::error::Error + Send + Sync>>,
    ) -> Result<RunSummary, PipelineError> {
        let mmap = self.mmap_file(path)?;
        let mut summary = RunSummary::default();
        let mut batch: Vec<(RawRecord, Result<Arc<dyn TopicDecoder>, &'static str>)> =
            Vec::with_capacity(self.batch_size);
        let mut taken: u64 = 0;

        for message in mcap::MessageStream::new(&mmap)? {
            let message = message?;
            let channel = &message.channel;
            if !self.topic_selected(&channel.topic) {
                continue;
            }
            if self.record_limit.is_some_and(|limit| taken >= limit) {
                break;
            }
            taken += 1;

            let message_enc = MessageEncoding::from(channel.message_encoding.as_str());
            let (message_type, schema_id, decoder) = match channel.schema.as_ref() {
                Some(schema) => {
                    let schema_enc = SchemaEncoding::from(schema.encoding.as_str());
                    let decoder = self
                        .registry
                        .resolve(
                            schema.id,
                            &schema.name,
                            &schema_enc,
                            &message_enc,
                            &schema.data,
                            &channel.topic,
                        )
                        .map_err(|e| e.fallback_reason());
                    (schema.name.clone(), schema.id, decoder)
                }
                None => (String::new(), 0, Err("schema_unresolved")),
            };
            self.registry.record_message(&channel.topic, &message_type);

            let raw = RawRecord {
                topic: channel.topic.clone(),
                message_type,
                schema_id,
                message_encoding: message_enc,
                payload: message.data.into_owned(),
                timestamp_ns: message.log_time,
            };
            batch.push((raw, decoder));

            if batch.len() >= self.batch_size {
                flush_batch(&mut batch, &mut summary, &mut callback)?;
            }
        }
        flush_batch(&mut batch, &mut summary, &mut callback)?;

        tracing::info!(
            messages = summary.messages,
            decoded = summary.decoded,
            fallbacks = summary.fallbacks,
            "bag conversion finished"
        );
        Ok(summary)
    }

    /// Total selected message count from the summary section, if present.
    pub fn message_count(&self, path: &Path) -> Result<Option<u64>, PipelineError> {
        let mmap = self.mmap_file(path)?;
        let Some(summary) = mcap::read::Summary::read(&mmap)? else {
            return Ok(None);
        };
        let Some(stats) = summary.stats.as_ref() else {
            return Ok(None);
        };
        if self.topic_filter.is_none() {
            return Ok(Some(stats.message_count));
        }
        let count = summary
            .channels
            .values()
            .filter(|ch| self.topic_selected(&ch.topic))
            .map(|ch| {
                stats
                    .channel_message_counts
                    .get(&ch.id)
                    .copied()
                    .unwrap_or_default()
            })
            .sum();
        Ok(Some(count))
    }

    /// Topic listing from the summary section, alphabetical by topic.
    pub fn list_topics(&self, path: &Path) -> Result<TopicListing, PipelineError> {
        let summary = self.read_summary(path)?;
        let mut entries: Vec<TopicEntry> = summary
            .channels
            .values()
            .filter(|ch| self.topic_selected(&ch.topic))
            .map(|ch| TopicEntry {
                topic: ch.topic.clone(),
                message_type: ch
                    .schema
                    .as_ref()
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
                count: summary
                    .stats
                    .as_ref()
                    .and_then(|stats| stats.channel_message_counts.get(&ch.id).copied())
                    .unwrap_or_default(),
            })
            .collect();
        entries.sort_by(|a, b| a.topic.cmp(&b.topic));
        let total = entries.iter().map(|e| e.count).sum();
        Ok(TopicListing { entries, total })
    }

    /// Schema listing for the bag: one entry per schema id, with its
    /// source text, the topics that carry it, and whether a decoder could
    /// be built for it.
    pub fn list_schemas(&self, path: &Path) -> Result<Vec<SchemaInfo>, PipelineError> {
        let summary = self.read_summary(path)?;
        for channel in summary.channels.values() {
            if !self.topic_selected(&channel.topic) {
                continue;
            }
            let Some(schema) = channel.schema.as_ref() else {
                continue;
            };
            let schema_enc = SchemaEncoding::from(schema.encoding.as_str());
            let message_enc = MessageEncoding::from(channel.message_encoding.as_str());
            let _ = self.registry.resolve(
                schema.id,
                &schema.name,
                &schema_enc,
                &message_enc,
                &schema.data,
                &channel.topic,
            );
        }
        Ok(self.registry.schemas())
    }
}

fn flush_batch(
    batch: &mut Vec<(RawRecord, Result<Arc<dyn TopicDecoder>, &'static str>)>,
    summary: &mut RunSummary,
    callback: &mut RecordCallback<'_>,
) -> Result<(), PipelineError> {
    if batch.is_empty() {
        return Ok(());
    }

    let records: Vec<OutputRecord> = batch
        .par_iter()
        .map(|(raw, decoder)| match decoder {
            Ok(decoder) => match decoder.decode(&raw.payload) {
                Ok(value) => OutputRecord::decoded(raw, &value),
                Err(e) => {
                    tracing::debug!(
                        topic = %raw.topic,
                        message_type = %raw.message_type,
                        error = %e,
                        "record decode failed"
                    );
                    fallback_record(raw, e.fallback_reason())
                }
            },
            Err(reason) => fallback_record(raw, reason),
        })
        .collect();
    batch.clear();

    for record in records {
        summary.messages += 1;
        if record.is_fallback() {
            summary.fallbacks += 1;
        } else {
            summary.decoded += 1;
        }
        callback(record).map_err(PipelineError::Callback)?;
    }
    Ok(())
}

impl BagReaderBuilder {
    /// Register a message decoder factory.
    pub fn with_decoder(mut self, decoder: Arc<dyn mcapjson_core::MessageDecoder>) -> Self {
        self.registry.register_decoder(decoder);
        self
    }

    /// Register the built-in decoders (ROS 2 IDL over CDR).
    pub fn with_default_decoders(self) -> Self {
        self.with_decoder(Arc::new(Ros2IdlDecoder::new()))
    }

    /// Number of records decoded per parallel batch (default: 1024).
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Restrict the run to the given topics. An empty filter selects all.
    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let filter: HashSet<String> = topics.into_iter().map(Into::into).collect();
        self.topic_filter = (!filter.is_empty()).then_some(filter);
        self
    }

    /// Stop after emitting this many records.
    pub fn with_record_limit(mut self, limit: u64) -> Self {
        self.record_limit = Some(limit);
        self
    }

    pub fn build(self) -> BagReader {
        BagReader {
            registry: self.registry,
            batch_size: self.batch_size,
            topic_filter: self.topic_filter,
            record_limit: self.record_limit,
        }
    }
}
