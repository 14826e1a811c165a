//! keywrap/types.rs

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::constants::wrap;
use crate::keywrap::custody::CustodyError;

/// Recipient x25519 public key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecipientPublicKey([u8; wrap::PUBLIC_KEY_LEN]);

impl RecipientPublicKey {
    pub const fn from_bytes(bytes: [u8; wrap::PUBLIC_KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; wrap::PUBLIC_KEY_LEN] {
        &self.0
    }

    /// Parse the base64 form wallets hand out.
    pub fn from_base64(s: &str) -> Result<Self, KeyWrapError> {
        let raw = B64
            .decode(s.trim())
            .map_err(|e| KeyWrapError::InvalidPublicKey(e.to_string()))?;
        let arr: [u8; wrap::PUBLIC_KEY_LEN] = raw.as_slice().try_into().map_err(|_| {
            KeyWrapError::InvalidPublicKey(format!(
                "expected {} bytes, got {}",
                wrap::PUBLIC_KEY_LEN,
                raw.len()
            ))
        })?;
        Ok(Self(arr))
    }

    pub fn to_base64(&self) -> String {
        B64.encode(self.0)
    }
}

/// Box envelope in the shape custody decrypt capabilities consume.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedEnvelope {
    pub version: String,
    pub nonce: String,
    pub ephem_public_key: String,
    pub ciphertext: String,
}

impl EncryptedEnvelope {
    /// Split the raw wrapped layout.
    pub fn from_wrapped_bytes(bytes: &[u8]) -> Result<Self, KeyWrapError> {
        let min = wrap::PUBLIC_KEY_LEN + wrap::NONCE_LEN + wrap::TAG_LEN;
        if bytes.len() < min {
            return Err(KeyWrapError::Malformed(format!(
                "wrapped key too short: min={}, actual={}",
                min,
                bytes.len()
            )));
        }
        let (ephem, rest) = bytes.split_at(wrap::PUBLIC_KEY_LEN);
        let (nonce, ciphertext) = rest.split_at(wrap::NONCE_LEN);
        Ok(Self {
            version: wrap::VERSION.to_owned(),
            nonce: B64.encode(nonce),
            ephem_public_key: B64.encode(ephem),
            ciphertext: B64.encode(ciphertext),
        })
    }

    /// Join back into the raw wrapped layout.
    pub fn to_wrapped_bytes(&self) -> Result<Vec<u8>, KeyWrapError> {
        let ephem = decode_field("ephemPublicKey", &self.ephem_public_key)?;
        let nonce = decode_field("nonce", &self.nonce)?;
        let ciphertext = decode_field("ciphertext", &self.ciphertext)?;
        if ephem.len() != wrap::PUBLIC_KEY_LEN || nonce.len() != wrap::NONCE_LEN {
            return Err(KeyWrapError::Malformed("bad ephemeral key or nonce length".into()));
        }
        let mut out = Vec::with_capacity(ephem.len() + nonce.len() + ciphertext.len());
        out.extend_from_slice(&ephem);
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }
}

pub(crate) fn decode_field(field: &str, value: &str) -> Result<Vec<u8>, KeyWrapError> {
    B64.decode(value)
        .map_err(|e| KeyWrapError::Malformed(format!("{}: {}", field, e)))
}

#[derive(Debug, thiserror::Error)]
pub enum KeyWrapError {
    #[error("invalid recipient public key: {0}")]
    InvalidPublicKey(String),

    #[error("malformed wrapped key: {0}")]
    Malformed(String),

    #[error("key wrap failed: {0}")]
    WrapFailed(String),

    /// The wrapped key or the recovered payload is unusable, or the custodian could not
    /// open it with its secret.
    #[error("key unwrap failed: {0}")]
    KeyUnwrapFailed(String),

    /// The custodian itself could not serve the request (no secret, timeout, offline).
    #[error("key custody: {0}")]
    Custody(CustodyError),
}
