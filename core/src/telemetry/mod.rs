//! telemetry/mod.rs
//! Per-operation counters for table encode/decode.

pub mod counters;

pub use counters::*;
