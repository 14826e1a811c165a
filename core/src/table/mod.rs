//! table/mod.rs
//! Row/column matrix <-> delimited text payload.
//!
//! Payload layout:
//! - Optional header line of column names.
//! - One line per row, cells joined by the delimiter. Every line, the header included,
//!   ends with `\n`, so an empty payload is exactly zero rows.
//! - Encrypted columns hold `\x..` cells; plain columns are verbatim.
//!
//! Column count per row is invariant; any deviation is a schema mismatch.

pub mod types;
pub mod encode;
pub mod decode;
pub mod parallel;

pub use types::*;
