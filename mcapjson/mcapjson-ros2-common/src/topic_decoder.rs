use mcapjson_core::{DecodeError, TopicDecoder, Value};

use crate::{ResolvedSchema, decode_cdr_to_value};

/// CDR topic decoder shared by every ROS 2 schema format.
pub struct Ros2CdrTopicDecoder {
    resolved: ResolvedSchema,
}

impl Ros2CdrTopicDecoder {
    pub fn new(resolved: ResolvedSchema) -> Self {
        Self { resolved }
    }

    pub fn schema(&self) -> &ResolvedSchema {
        &self.resolved
    }
}

impl TopicDecoder for Ros2CdrTopicDecoder {
    fn decode(&self, payload: &[u8]) -> Result<Value, DecodeError> {
        decode_cdr_to_value(&self.resolved, payload)
    }
}
