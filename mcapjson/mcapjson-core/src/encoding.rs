//! Message and schema encoding identifiers from the MCAP spec registry.
//!
//! <https://mcap.dev/spec/registry>

use std::fmt;

/// Message (payload) encodings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageEncoding {
    /// ROS 1 serialization (`ros1`)
    Ros1,
    /// CDR, used by ROS 2 (`cdr`)
    Cdr,
    /// Protocol Buffers (`protobuf`)
    Protobuf,
    /// JSON (`json`)
    Json,
    /// Unknown/custom encoding
    Unknown(String),
}

impl MessageEncoding {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ros1 => "ros1",
            Self::Cdr => "cdr",
            Self::Protobuf => "protobuf",
            Self::Json => "json",
            Self::Unknown(s) => s,
        }
    }
}

impl From<&str> for MessageEncoding {
    fn from(s: &str) -> Self {
        match s {
            "ros1" => Self::Ros1,
            "cdr" => Self::Cdr,
            "protobuf" => Self::Protobuf,
            "json" => Self::Json,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for MessageEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema encodings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaEncoding {
    /// No schema (self-describing formats)
    None,
    /// ROS 2 Message definition (`ros2msg`)
    Ros2Msg,
    /// ROS 2 IDL (`ros2idl`)
    Ros2Idl,
    /// OMG IDL (`omgidl`)
    OmgIdl,
    /// Unknown/custom encoding
    Unknown(String),
}

impl SchemaEncoding {
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "",
            Self::Ros2Msg => "ros2msg",
            Self::Ros2Idl => "ros2idl",
            Self::OmgIdl => "omgidl",
            Self::Unknown(s) => s,
        }
    }
}

impl From<&str> for SchemaEncoding {
    fn from(s: &str) -> Self {
        match s {
            "" => Self::None,
            "ros2msg" => Self::Ros2Msg,
            "ros2idl" => Self::Ros2Idl,
            "omgidl" => Self::OmgIdl,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for SchemaEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
