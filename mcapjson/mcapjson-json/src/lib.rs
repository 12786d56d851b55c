//! JSON emission, fallback encoding, and record reshaping for `mcapjson`.
//!
//! This crate owns everything between a decoded [`mcapjson_core::Value`]
//! tree and the line-delimited JSON leaving the pipeline: conversion to
//! `serde_json::Value`, the base64 fallback path for undecodable records,
//! and the timestamp/topic reshaping applied before re-streaming.
//!
//! # 64-bit integer caveat
//!
//! 64-bit integers are emitted as exact JSON numeric literals. Consumers
//! with 53-bit-safe number semantics (JavaScript) will round values above
//! 2^53; this is a property of those consumers, not of the emitted JSON.

mod emit;
mod fallback;
mod record;
mod transform;

pub use emit::value_to_json;
pub use fallback::{fallback_data, fallback_record};
pub use record::{OutputRecord, Timestamp};
pub use transform::{nest_under_topic, timestamp_to_seconds, transform_record};
