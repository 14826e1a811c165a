//! codec/mod.rs
//! Typed scalar codec: canonical byte encodings per declared column type.
//!
//! Layout notes:
//! - Fixed-width numerics are little-endian (two's complement / IEEE-754).
//! - Decimal and Text are raw UTF-8 with no length prefix; the enclosing cipher frame
//!   carries the length.
//! - Timestamp is an i64 count of microseconds since 2000-01-01, shifted by the
//!   configured timezone offset. Encode and decode must use the same `TimestampZone`.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
