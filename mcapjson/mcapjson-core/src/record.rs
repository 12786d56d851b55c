//! Raw record type delivered by the bag reader.

use crate::encoding::MessageEncoding;

/// One raw message as read from the bag, before any decoding.
///
/// Records arrive in file order, not necessarily timestamp order.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub topic: String,
    /// Fully-qualified message type name, e.g. `sensor_msgs/msg/LaserScan`.
    pub message_type: String,
    /// Schema identifier from the container; keys the schema registry.
    pub schema_id: u16,
    pub message_encoding: MessageEncoding,
    /// Serialized payload, including the CDR encapsulation header.
    pub payload: Vec<u8>,
    /// Log time in nanoseconds.
    pub timestamp_ns: u64,
}
