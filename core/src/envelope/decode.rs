//! envelope/decode.rs
//! `\x`-prefixed hex cell -> typed value.
//!
//! Order of checks: key, frame shape, outer checksum, decrypt, inner checksum, type,
//! typed decode. Nothing is decrypted until the outer checksum passes.

use crate::codec::ScalarValue;
use crate::column::Column;
use crate::constants::{CHECKSUM_WIDTH, CIPHER_HEX_PREFIX};
use crate::crypto::{aes_cbc_decrypt, xor_checksum, CryptoError};
use crate::envelope::encode::EnvelopeEncryptor;
use crate::envelope::types::{ChecksumLayer, CipherFrame, EnvelopeError};

/// Strip the prefix and split a cell into its frame parts.
pub fn parse_cipher_text(text: &str) -> Result<CipherFrame, EnvelopeError> {
    let body = text.strip_prefix(CIPHER_HEX_PREFIX).ok_or(EnvelopeError::MissingPrefix)?;
    let bytes = hex::decode(body)?;
    CipherFrame::from_bytes(&bytes)
}

impl EnvelopeEncryptor {
    pub fn decrypt_value(&self, text: &str, column: &Column) -> Result<ScalarValue, EnvelopeError> {
        let key = column
            .data_key()
            .ok_or_else(|| EnvelopeError::MissingDataKey { column: column.name().to_owned() })?;

        let frame = parse_cipher_text(text)?;

        let outer = xor_checksum(&frame.covered(), CHECKSUM_WIDTH);
        if outer != frame.checksum {
            return Err(EnvelopeError::ChecksumMismatch {
                layer: ChecksumLayer::Outer,
                expected: frame.checksum,
                actual: outer,
            });
        }

        let mut plaintext = match aes_cbc_decrypt(key, &frame.iv, &frame.ciphertext) {
            Ok(pt) => pt,
            Err(CryptoError::Unpad) => {
                return Err(EnvelopeError::ChecksumMismatch {
                    layer: ChecksumLayer::Inner,
                    expected: Vec::new(),
                    actual: Vec::new(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        if plaintext.len() < CHECKSUM_WIDTH {
            return Err(EnvelopeError::ChecksumMismatch {
                layer: ChecksumLayer::Inner,
                expected: Vec::new(),
                actual: plaintext,
            });
        }
        let stored = plaintext.split_off(plaintext.len() - CHECKSUM_WIDTH);
        let inner = xor_checksum(&plaintext, CHECKSUM_WIDTH);
        if inner != stored {
            return Err(EnvelopeError::ChecksumMismatch {
                layer: ChecksumLayer::Inner,
                expected: stored,
                actual: inner,
            });
        }

        let ty = column
            .column_type()
            .ok_or_else(|| EnvelopeError::MissingType { column: column.name().to_owned() })?;
        Ok(self.codec().decode(&plaintext, ty)?)
    }

    /// Decrypt a cell to its canonical text.
    pub fn decrypt_cell(&self, text: &str, column: &Column) -> Result<String, EnvelopeError> {
        self.decrypt_value(text, column).map(|v| v.to_text())
    }
}
