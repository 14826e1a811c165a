//! codec/types.rs
//! Column type registry, scalar values and the timestamp offset policy.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_enum::TryFromPrimitive;
use thiserror::Error;

use crate::constants::{type_ids, DECIMAL_MAX_EXPONENT};

/// Declared column types.
///
/// Tag, canonical name and variant form a total bijection; anything outside it is
/// rejected with `CodecError::UnsupportedType`, never defaulted.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum ColumnType {
    Int32     = type_ids::INT4,
    Int64     = type_ids::INT8,
    Float32   = type_ids::FLOAT4,
    Float64   = type_ids::FLOAT8,
    Decimal   = type_ids::DECIMAL,
    Text      = type_ids::TEXT,
    Timestamp = type_ids::TIMESTAMP,
}

impl ColumnType {
    pub const ALL: [ColumnType; 7] = [
        ColumnType::Int32,
        ColumnType::Int64,
        ColumnType::Float32,
        ColumnType::Float64,
        ColumnType::Decimal,
        ColumnType::Text,
        ColumnType::Timestamp,
    ];

    /// Numeric tag used in source column refs.
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Resolve a numeric tag. Tags outside `u8` are unsupported as well.
    pub fn from_tag(raw: u32) -> Result<Self, CodecError> {
        u8::try_from(raw)
            .ok()
            .and_then(|b| ColumnType::try_from_primitive(b).ok())
            .ok_or_else(|| CodecError::UnsupportedType { raw: format!("tag {}", raw) })
    }

    /// Canonical name used in the metadata document.
    pub const fn name(self) -> &'static str {
        match self {
            ColumnType::Int32     => "int4",
            ColumnType::Int64     => "int8",
            ColumnType::Float32   => "float4",
            ColumnType::Float64   => "float8",
            ColumnType::Decimal   => "decimal",
            ColumnType::Text      => "text",
            ColumnType::Timestamp => "timestamp",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CodecError> {
        match name {
            "int4"      => Ok(ColumnType::Int32),
            "int8"      => Ok(ColumnType::Int64),
            "float4"    => Ok(ColumnType::Float32),
            "float8"    => Ok(ColumnType::Float64),
            "decimal"   => Ok(ColumnType::Decimal),
            "text"      => Ok(ColumnType::Text),
            "timestamp" => Ok(ColumnType::Timestamp),
            other => Err(CodecError::UnsupportedType { raw: format!("name {:?}", other) }),
        }
    }

    /// Encoded width for fixed-width types; `None` for variable-length ones.
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            ColumnType::Int32 | ColumnType::Float32 => Some(4),
            ColumnType::Int64 | ColumnType::Float64 | ColumnType::Timestamp => Some(8),
            ColumnType::Decimal | ColumnType::Text => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColumnType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColumnType::from_name(s)
    }
}

/// Microseconds since the Unix epoch.
///
/// Cell text carries milliseconds; sub-millisecond precision survives as a fractional part.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub fn from_millis(millis: i64) -> Result<Self, CodecError> {
        millis
            .checked_mul(1000)
            .map(Self)
            .ok_or_else(|| CodecError::invalid(ColumnType::Timestamp, "milliseconds out of range"))
    }

    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// Parse decimal milliseconds (`"1700000000000"`, `"1.5"`, `"-12.0005"`).
    ///
    /// Digits beyond microsecond precision are floored, matching `floor(ms * 1000)`.
    pub fn parse_millis(text: &str) -> Result<Self, CodecError> {
        let s = text.trim();
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));

        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
            return Err(CodecError::invalid(ColumnType::Timestamp, format!("not decimal milliseconds: {:?}", text)));
        }

        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| CodecError::invalid(ColumnType::Timestamp, "milliseconds out of range"))?
        };

        let mut sub_millis = 0i64;
        for i in 0..3 {
            let digit = frac_part.as_bytes().get(i).map(|b| (b - b'0') as i64).unwrap_or(0);
            sub_millis = sub_millis * 10 + digit;
        }
        let truncated = frac_part.len() > 3 && frac_part[3..].bytes().any(|b| b != b'0');

        let magnitude = whole
            .checked_mul(1000)
            .and_then(|m| m.checked_add(sub_millis))
            .ok_or_else(|| CodecError::invalid(ColumnType::Timestamp, "milliseconds out of range"))?;

        let micros = if negative {
            -magnitude - i64::from(truncated)
        } else {
            magnitude
        };
        Ok(Self(micros))
    }

    /// Decimal milliseconds, fractional part only when sub-millisecond digits exist.
    pub fn to_millis_text(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let (whole, frac) = (abs / 1000, abs % 1000);
        if frac == 0 {
            format!("{}{}", sign, whole)
        } else {
            let frac = format!("{:03}", frac);
            format!("{}{}.{}", sign, whole, frac.trim_end_matches('0'))
        }
    }
}

/// Timezone offset folded into encoded timestamps.
///
/// Offsets follow the `getTimezoneOffset` convention: minutes of `UTC - local`, so a
/// UTC+8 machine has an offset of -480.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum TimestampZone {
    /// Offset of the current machine at the moment of the call.
    #[default]
    Local,
    /// No offset.
    Utc,
    /// Explicit offset in minutes.
    FixedMinutes(i32),
}

impl TimestampZone {
    /// Offset in microseconds to add on encode (and subtract on decode).
    pub fn offset_micros(self) -> i64 {
        match self {
            TimestampZone::Local => {
                let east_secs = chrono::Local::now().offset().local_minus_utc() as i64;
                -east_secs * 1_000_000
            }
            TimestampZone::Utc => 0,
            TimestampZone::FixedMinutes(minutes) => minutes as i64 * 60 * 1_000_000,
        }
    }

    /// Parse `local`, `utc`, or a signed minute count.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "local" => Some(TimestampZone::Local),
            "utc" => Some(TimestampZone::Utc),
            other => other.parse::<i32>().ok().map(TimestampZone::FixedMinutes),
        }
    }
}

impl fmt::Display for TimestampZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampZone::Local => f.write_str("local"),
            TimestampZone::Utc => f.write_str("utc"),
            TimestampZone::FixedMinutes(m) => write!(f, "{}", m),
        }
    }
}

/// A typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Decimal(BigDecimal),
    Text(String),
    Timestamp(Timestamp),
}

impl ScalarValue {
    pub fn column_type(&self) -> ColumnType {
        match self {
            ScalarValue::Int32(_)     => ColumnType::Int32,
            ScalarValue::Int64(_)     => ColumnType::Int64,
            ScalarValue::Float32(_)   => ColumnType::Float32,
            ScalarValue::Float64(_)   => ColumnType::Float64,
            ScalarValue::Decimal(_)   => ColumnType::Decimal,
            ScalarValue::Text(_)      => ColumnType::Text,
            ScalarValue::Timestamp(_) => ColumnType::Timestamp,
        }
    }

    /// Parse raw cell text as a value of `ty`. Text is taken verbatim.
    pub fn parse(text: &str, ty: ColumnType) -> Result<Self, CodecError> {
        let trimmed = text.trim();
        match ty {
            ColumnType::Int32 => trimmed
                .parse::<i32>()
                .map(ScalarValue::Int32)
                .map_err(|e| CodecError::invalid(ty, format!("{:?}: {}", text, e))),
            ColumnType::Int64 => trimmed
                .parse::<i64>()
                .map(ScalarValue::Int64)
                .map_err(|e| CodecError::invalid(ty, format!("{:?}: {}", text, e))),
            ColumnType::Float32 => {
                let v = trimmed
                    .parse::<f32>()
                    .map_err(|e| CodecError::invalid(ty, format!("{:?}: {}", text, e)))?;
                ensure_finite(ty, v.is_finite())?;
                Ok(ScalarValue::Float32(v))
            }
            ColumnType::Float64 => {
                let v = trimmed
                    .parse::<f64>()
                    .map_err(|e| CodecError::invalid(ty, format!("{:?}: {}", text, e)))?;
                ensure_finite(ty, v.is_finite())?;
                Ok(ScalarValue::Float64(v))
            }
            ColumnType::Decimal => {
                let d = BigDecimal::from_str(trimmed)
                    .map_err(|e| CodecError::invalid(ty, format!("{:?}: {}", text, e)))?;
                ensure_decimal_range(&d)?;
                Ok(ScalarValue::Decimal(d))
            }
            ColumnType::Text => Ok(ScalarValue::Text(text.to_owned())),
            ColumnType::Timestamp => Timestamp::parse_millis(trimmed).map(ScalarValue::Timestamp),
        }
    }

    /// Canonical cell text. Int64, Decimal and Timestamp come out as decimal text.
    pub fn to_text(&self) -> String {
        match self {
            ScalarValue::Int32(v) => v.to_string(),
            ScalarValue::Int64(v) => v.to_string(),
            ScalarValue::Float32(v) => v.to_string(),
            ScalarValue::Float64(v) => v.to_string(),
            ScalarValue::Decimal(d) => canonical_decimal(d),
            ScalarValue::Text(s) => s.clone(),
            ScalarValue::Timestamp(t) => t.to_millis_text(),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Plain-notation decimal with trailing fractional zeros removed.
///
/// Values whose exponent exceeds `DECIMAL_MAX_EXPONENT` never reach the codec; if one
/// is rendered anyway it comes out as `<digits>e<exp>`.
pub fn canonical_decimal(d: &BigDecimal) -> String {
    if ensure_decimal_range(d).is_err() {
        let (digits, scale) = d.as_bigint_and_exponent();
        return format!("{}e{}", digits, -i128::from(scale));
    }
    d.normalized().to_plain_string()
}

/// Rejects decimals whose exponent magnitude exceeds `DECIMAL_MAX_EXPONENT`.
pub fn ensure_decimal_range(d: &BigDecimal) -> Result<(), CodecError> {
    let (_, scale) = d.as_bigint_and_exponent();
    if scale.unsigned_abs() > DECIMAL_MAX_EXPONENT {
        return Err(CodecError::invalid(
            ColumnType::Decimal,
            format!("exponent {} out of range (max {})", -i128::from(scale), DECIMAL_MAX_EXPONENT),
        ));
    }
    Ok(())
}

fn ensure_finite(ty: ColumnType, finite: bool) -> Result<(), CodecError> {
    if finite {
        Ok(())
    } else {
        Err(CodecError::invalid(ty, "NaN and infinities are not encodable"))
    }
}

#[derive(Debug, Error)]
pub enum CodecError {
    /// Tag or name outside the column type registry.
    #[error("unsupported column type: {raw}")]
    UnsupportedType { raw: String },

    /// Value variant does not match the declared column type.
    #[error("type mismatch: column is {expected}, value is {actual}")]
    TypeMismatch { expected: ColumnType, actual: ColumnType },

    /// Encoded bytes have the wrong width for a fixed-width type.
    #[error("invalid {column_type} encoding length: expected={expected}, actual={actual}")]
    InvalidLength { column_type: ColumnType, expected: usize, actual: usize },

    /// Value cannot be represented (parse failure, overflow, non-finite, bad UTF-8).
    #[error("invalid {column_type} value: {reason}")]
    InvalidValue { column_type: ColumnType, reason: String },
}

impl CodecError {
    pub(crate) fn invalid(column_type: ColumnType, reason: impl Into<String>) -> Self {
        CodecError::InvalidValue { column_type, reason: reason.into() }
    }
}
