//! Schema-driven CDR → JSON conversion pipeline for ROS 2 MCAP bags.
//!
//! [`BagReader`] streams messages out of a bag, builds decoders lazily
//! through the [`SchemaRegistry`], decodes record batches in parallel,
//! and emits self-describing [`OutputRecord`]s. Records that cannot be
//! decoded fall back to base64 raw bytes with an error tag; a run never
//! aborts on a bad record. [`Forwarder`] re-streams records to a
//! [`Transport`] behind a bounded queue.

mod error;
mod forward;
mod reader;
mod registry;

pub use error::PipelineError;
pub use forward::{Forwarder, Transport, TransportError};
pub use mcapjson_core as core;
pub use mcapjson_json as json;
pub use mcapjson_json::OutputRecord;
pub use reader::{BagReader, BagReaderBuilder, RunSummary};
pub use registry::{SchemaInfo, SchemaRegistry, TopicEntry, TopicListing};
