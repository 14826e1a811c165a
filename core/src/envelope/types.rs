//! envelope/types.rs

use std::fmt;

use crate::codec::CodecError;
use crate::constants::{AES_BLOCK_LEN, CHECKSUM_WIDTH, IV_LEN};
use crate::crypto::CryptoError;

/// Parsed cell frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CipherFrame {
    pub checksum: Vec<u8>,
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
}

impl CipherFrame {
    /// Smallest well-formed frame: checksum, IV and one cipher block.
    pub const MIN_LEN: usize = CHECKSUM_WIDTH + IV_LEN + AES_BLOCK_LEN;

    /// Bytes covered by the outer checksum.
    pub fn covered(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(IV_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.checksum.len() + IV_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.checksum);
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        if bytes.len() < Self::MIN_LEN {
            return Err(EnvelopeError::FrameTooShort { min: Self::MIN_LEN, actual: bytes.len() });
        }
        let (checksum, rest) = bytes.split_at(CHECKSUM_WIDTH);
        let (iv, ciphertext) = rest.split_at(IV_LEN);
        let mut iv_arr = [0u8; IV_LEN];
        iv_arr.copy_from_slice(iv);
        Ok(Self { checksum: checksum.to_vec(), iv: iv_arr, ciphertext: ciphertext.to_vec() })
    }
}

/// Which checksum failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChecksumLayer {
    /// Over `iv || cipher`, checked before decryption.
    Outer,
    /// Over the typed plaintext, checked after decryption.
    Inner,
}

impl fmt::Display for ChecksumLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumLayer::Outer => f.write_str("outer"),
            ChecksumLayer::Inner => f.write_str("inner"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("column {column:?} is encrypted but has no data key")]
    MissingDataKey { column: String },

    #[error("column {column:?} has no declared type")]
    MissingType { column: String },

    /// Corruption detected. A padding failure after a passing outer checksum is
    /// reported here too, at the inner layer.
    #[error("{layer} checksum mismatch: expected={}, actual={}", hex::encode(.expected), hex::encode(.actual))]
    ChecksumMismatch { layer: ChecksumLayer, expected: Vec<u8>, actual: Vec<u8> },

    #[error("cipher cell must start with \\x")]
    MissingPrefix,

    #[error("cipher cell is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("cipher frame too short: min={min}, actual={actual}")]
    FrameTooShort { min: usize, actual: usize },

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}
