//! keywrap/custody.rs
//! Key custody capability: the holder of the x25519 secret.
//!
//! The wrapping code only ever sees the public key and the decrypted plaintext; the
//! secret stays behind this trait (a wallet, a KMS, or `LocalKeyCustody`).

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use crypto_box::aead::generic_array::GenericArray;
use crypto_box::aead::Aead;
use crypto_box::{PublicKey, SalsaBox, SecretKey};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::constants::wrap;
use crate::keywrap::types::{decode_field, EncryptedEnvelope, RecipientPublicKey};

#[async_trait]
pub trait KeyCustody: Send + Sync {
    /// Public half used to wrap keys for this custodian.
    async fn encryption_public_key(&self) -> Result<RecipientPublicKey, CustodyError>;

    /// Open a box envelope and return its UTF-8 plaintext.
    async fn decrypt(&self, envelope: &EncryptedEnvelope) -> Result<String, CustodyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CustodyError {
    #[error("custody holds no secret key")]
    NoSecret,

    #[error("unsupported envelope version {0:?}")]
    UnsupportedVersion(String),

    #[error("malformed envelope: {0}")]
    Malformed(String),

    #[error("decryption failed")]
    DecryptFailed,

    #[error("invalid secret key: {0}")]
    InvalidSecret(String),

    #[error("custody unavailable: {0}")]
    Unavailable(String),
}

/// In-process custodian holding an x25519 secret.
pub struct LocalKeyCustody {
    public: RecipientPublicKey,
    secret: Option<Zeroizing<[u8; wrap::SECRET_KEY_LEN]>>,
}

impl LocalKeyCustody {
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0u8; wrap::SECRET_KEY_LEN]);
        OsRng.fill_bytes(&mut bytes[..]);
        Self::from_secret_bytes(*bytes)
    }

    pub fn from_secret_bytes(bytes: [u8; wrap::SECRET_KEY_LEN]) -> Self {
        let secret = SecretKey::from(bytes);
        let public = RecipientPublicKey::from_bytes(*secret.public_key().as_bytes());
        Self::from_parts(public, bytes)
    }

    pub fn from_secret_base64(s: &str) -> Result<Self, CustodyError> {
        let raw = Zeroizing::new(
            B64.decode(s.trim()).map_err(|e| CustodyError::InvalidSecret(e.to_string()))?,
        );
        let arr: [u8; wrap::SECRET_KEY_LEN] = raw.as_slice().try_into().map_err(|_| {
            CustodyError::InvalidSecret(format!(
                "expected {} bytes, got {}",
                wrap::SECRET_KEY_LEN,
                raw.len()
            ))
        })?;
        Ok(Self::from_secret_bytes(arr))
    }

    /// Export-only custodian: can hand out the public key, cannot decrypt.
    pub fn public_only(public: RecipientPublicKey) -> Self {
        Self { public, secret: None }
    }

    pub fn public_key(&self) -> RecipientPublicKey {
        self.public
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    pub fn secret_key_base64(&self) -> Option<String> {
        self.secret.as_ref().map(|s| B64.encode(s.as_ref()))
    }

    fn from_parts(public: RecipientPublicKey, secret: [u8; wrap::SECRET_KEY_LEN]) -> Self {
        Self { public, secret: Some(Zeroizing::new(secret)) }
    }

    fn open(&self, envelope: &EncryptedEnvelope) -> Result<String, CustodyError> {
        let secret = self.secret.as_ref().ok_or(CustodyError::NoSecret)?;
        if envelope.version != wrap::VERSION {
            return Err(CustodyError::UnsupportedVersion(envelope.version.clone()));
        }

        let nonce = decode_field("nonce", &envelope.nonce)
            .map_err(|e| CustodyError::Malformed(e.to_string()))?;
        let ephem = decode_field("ephemPublicKey", &envelope.ephem_public_key)
            .map_err(|e| CustodyError::Malformed(e.to_string()))?;
        let ciphertext = decode_field("ciphertext", &envelope.ciphertext)
            .map_err(|e| CustodyError::Malformed(e.to_string()))?;

        if nonce.len() != wrap::NONCE_LEN {
            return Err(CustodyError::Malformed(format!("nonce length {}", nonce.len())));
        }
        let ephem: [u8; wrap::PUBLIC_KEY_LEN] = ephem
            .as_slice()
            .try_into()
            .map_err(|_| CustodyError::Malformed(format!("ephemeral key length {}", ephem.len())))?;

        let sealed = SalsaBox::new(&PublicKey::from(ephem), &SecretKey::from(**secret));
        let plain = Zeroizing::new(
            sealed
                .decrypt(GenericArray::from_slice(&nonce), ciphertext.as_slice())
                .map_err(|_| CustodyError::DecryptFailed)?,
        );
        String::from_utf8(plain.to_vec()).map_err(|_| CustodyError::DecryptFailed)
    }
}

impl std::fmt::Debug for LocalKeyCustody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKeyCustody")
            .field("public", &self.public.to_base64())
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl KeyCustody for LocalKeyCustody {
    async fn encryption_public_key(&self) -> Result<RecipientPublicKey, CustodyError> {
        Ok(self.public)
    }

    async fn decrypt(&self, envelope: &EncryptedEnvelope) -> Result<String, CustodyError> {
        self.open(envelope)
    }
}
