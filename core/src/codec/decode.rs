//! codec/decode.rs
//!
//! Canonical bytes -> scalar.
//!
//! Design notes:
//! - Fixed-width types require the exact width; trailing or missing bytes mean the
//!   frame was produced for a different type.
//! - Decimal bytes are re-parsed and re-canonicalized so the result is canonical text
//!   even when the producer wrote a non-normalized form.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use byteorder::{ByteOrder, LittleEndian};

use crate::codec::encode::TypedValueCodec;
use crate::codec::types::{ensure_decimal_range, CodecError, ColumnType, ScalarValue, Timestamp};
use crate::constants::PG_EPOCH_OFFSET_MICROS;

impl TypedValueCodec {
    /// Decode `bytes` as declared column type `ty`.
    pub fn decode(&self, bytes: &[u8], ty: ColumnType) -> Result<ScalarValue, CodecError> {
        if let Some(width) = ty.fixed_width() {
            if bytes.len() != width {
                return Err(CodecError::InvalidLength {
                    column_type: ty,
                    expected: width,
                    actual: bytes.len(),
                });
            }
        }

        match ty {
            ColumnType::Int32 => Ok(ScalarValue::Int32(LittleEndian::read_i32(bytes))),
            ColumnType::Int64 => Ok(ScalarValue::Int64(LittleEndian::read_i64(bytes))),
            ColumnType::Float32 => Ok(ScalarValue::Float32(LittleEndian::read_f32(bytes))),
            ColumnType::Float64 => Ok(ScalarValue::Float64(LittleEndian::read_f64(bytes))),
            ColumnType::Decimal => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| CodecError::invalid(ty, e.to_string()))?;
                let d = BigDecimal::from_str(text)
                    .map_err(|e| CodecError::invalid(ty, format!("{:?}: {}", text, e)))?;
                ensure_decimal_range(&d)?;
                Ok(ScalarValue::Decimal(d))
            }
            ColumnType::Text => String::from_utf8(bytes.to_vec())
                .map(ScalarValue::Text)
                .map_err(|e| CodecError::invalid(ty, e.to_string())),
            ColumnType::Timestamp => {
                let stored = LittleEndian::read_i64(bytes);
                let micros = stored
                    .checked_add(PG_EPOCH_OFFSET_MICROS)
                    .and_then(|m| m.checked_sub(self.zone().offset_micros()))
                    .ok_or_else(|| CodecError::invalid(ty, "timestamp out of range"))?;
                Ok(ScalarValue::Timestamp(Timestamp::from_micros(micros)))
            }
        }
    }

    /// Decode `bytes` as `ty` and render canonical cell text.
    pub fn decode_text(&self, bytes: &[u8], ty: ColumnType) -> Result<String, CodecError> {
        self.decode(bytes, ty).map(|v| v.to_text())
    }
}
