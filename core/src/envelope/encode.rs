//! envelope/encode.rs
//! Typed value -> `\x`-prefixed hex cell.

use crate::codec::{ScalarValue, TimestampZone, TypedValueCodec};
use crate::column::Column;
use crate::constants::{CHECKSUM_WIDTH, CIPHER_HEX_PREFIX};
use crate::crypto::{aes_cbc_encrypt, random_iv, xor_checksum};
use crate::envelope::types::{CipherFrame, EnvelopeError};

/// Encrypts and decrypts single cells for a column.
#[derive(Copy, Clone, Debug, Default)]
pub struct EnvelopeEncryptor {
    codec: TypedValueCodec,
}

impl EnvelopeEncryptor {
    pub fn new(zone: TimestampZone) -> Self {
        Self { codec: TypedValueCodec::new(zone) }
    }

    pub fn codec(&self) -> &TypedValueCodec {
        &self.codec
    }

    /// Encrypt a typed value under the column's key.
    pub fn encrypt_value(&self, value: &ScalarValue, column: &Column) -> Result<String, EnvelopeError> {
        let key = column
            .data_key()
            .ok_or_else(|| EnvelopeError::MissingDataKey { column: column.name().to_owned() })?;
        let ty = column
            .column_type()
            .ok_or_else(|| EnvelopeError::MissingType { column: column.name().to_owned() })?;

        let mut plaintext = self.codec.encode(value, ty)?;
        let inner = xor_checksum(&plaintext, CHECKSUM_WIDTH);
        plaintext.extend_from_slice(&inner);

        let iv = random_iv();
        let ciphertext = aes_cbc_encrypt(key, &iv, &plaintext);

        let mut frame = CipherFrame { checksum: Vec::new(), iv, ciphertext };
        frame.checksum = xor_checksum(&frame.covered(), CHECKSUM_WIDTH);

        Ok(format!("{}{}", CIPHER_HEX_PREFIX, hex::encode(frame.to_bytes())))
    }

    /// Parse raw cell text per the column type, then encrypt it.
    pub fn encrypt_cell(&self, raw: &str, column: &Column) -> Result<String, EnvelopeError> {
        if column.data_key().is_none() {
            return Err(EnvelopeError::MissingDataKey { column: column.name().to_owned() });
        }
        let ty = column
            .column_type()
            .ok_or_else(|| EnvelopeError::MissingType { column: column.name().to_owned() })?;
        let value = ScalarValue::parse(raw, ty)?;
        self.encrypt_value(&value, column)
    }
}
