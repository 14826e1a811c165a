//! codec/encode.rs
//!
//! Scalar -> canonical bytes.
//!
//! Design notes:
//! - Fixed-width types are written into stack buffers in little-endian order.
//! - The declared column type is authoritative; a value of another variant is rejected
//!   rather than coerced.
//! - Timestamp arithmetic is checked; overflow is an invalid value, not a wrap.

use byteorder::{ByteOrder, LittleEndian};

use crate::codec::types::{canonical_decimal, ensure_decimal_range, CodecError, ColumnType, ScalarValue, TimestampZone};
use crate::constants::PG_EPOCH_OFFSET_MICROS;

/// Typed value codec bound to a timestamp offset policy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TypedValueCodec {
    zone: TimestampZone,
}

impl TypedValueCodec {
    pub const fn new(zone: TimestampZone) -> Self {
        Self { zone }
    }

    pub const fn zone(&self) -> TimestampZone {
        self.zone
    }

    /// Encode `value` as declared column type `ty`.
    pub fn encode(&self, value: &ScalarValue, ty: ColumnType) -> Result<Vec<u8>, CodecError> {
        if value.column_type() != ty {
            return Err(CodecError::TypeMismatch { expected: ty, actual: value.column_type() });
        }

        match value {
            ScalarValue::Int32(v) => {
                let mut buf = [0u8; 4];
                LittleEndian::write_i32(&mut buf, *v);
                Ok(buf.to_vec())
            }
            ScalarValue::Int64(v) => {
                let mut buf = [0u8; 8];
                LittleEndian::write_i64(&mut buf, *v);
                Ok(buf.to_vec())
            }
            ScalarValue::Float32(v) => {
                if !v.is_finite() {
                    return Err(CodecError::invalid(ty, "NaN and infinities are not encodable"));
                }
                let mut buf = [0u8; 4];
                LittleEndian::write_f32(&mut buf, *v);
                Ok(buf.to_vec())
            }
            ScalarValue::Float64(v) => {
                if !v.is_finite() {
                    return Err(CodecError::invalid(ty, "NaN and infinities are not encodable"));
                }
                let mut buf = [0u8; 8];
                LittleEndian::write_f64(&mut buf, *v);
                Ok(buf.to_vec())
            }
            ScalarValue::Decimal(d) => {
                ensure_decimal_range(d)?;
                Ok(canonical_decimal(d).into_bytes())
            }
            ScalarValue::Text(s) => Ok(s.as_bytes().to_vec()),
            ScalarValue::Timestamp(t) => {
                let stored = t
                    .as_micros()
                    .checked_sub(PG_EPOCH_OFFSET_MICROS)
                    .and_then(|m| m.checked_add(self.zone.offset_micros()))
                    .ok_or_else(|| CodecError::invalid(ty, "timestamp out of range"))?;
                let mut buf = [0u8; 8];
                LittleEndian::write_i64(&mut buf, stored);
                Ok(buf.to_vec())
            }
        }
    }

    /// Parse raw cell text as `ty` and encode it.
    pub fn encode_text(&self, text: &str, ty: ColumnType) -> Result<Vec<u8>, CodecError> {
        let value = ScalarValue::parse(text, ty)?;
        self.encode(&value, ty)
    }
}
