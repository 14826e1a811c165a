//! keywrap/wrap.rs
//! Wrap a data key for a recipient, unwrap through a custody capability.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use crypto_box::aead::{Aead, AeadCore, OsRng};
use crypto_box::{PublicKey, SalsaBox, SecretKey};
use zeroize::Zeroizing;

use crate::crypto::DataKey;
use crate::keywrap::custody::{CustodyError, KeyCustody};
use crate::keywrap::types::{EncryptedEnvelope, KeyWrapError, RecipientPublicKey};

/// Box `base64(key)` for `recipient` under a fresh ephemeral keypair.
pub fn wrap_data_key(key: &DataKey, recipient: &RecipientPublicKey) -> Result<String, KeyWrapError> {
    let ephemeral = SecretKey::generate(&mut OsRng);
    let ephem_public = ephemeral.public_key();
    let sealed = SalsaBox::new(&PublicKey::from(*recipient.as_bytes()), &ephemeral);
    let nonce = SalsaBox::generate_nonce(&mut OsRng);

    let message = Zeroizing::new(B64.encode(key.as_bytes()));
    let ciphertext = sealed
        .encrypt(&nonce, message.as_bytes())
        .map_err(|_| KeyWrapError::WrapFailed("box encryption failed".into()))?;

    let mut out = Vec::with_capacity(ephem_public.as_bytes().len() + nonce.len() + ciphertext.len());
    out.extend_from_slice(ephem_public.as_bytes());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(B64.encode(out))
}

/// Recover a data key from its wrapped form.
///
/// Custodian outages (`NoSecret`, `Unavailable`) come back as `KeyWrapError::Custody`;
/// every other failure is `KeyUnwrapFailed`.
pub async fn unwrap_data_key(
    wrapped: &str,
    custody: &dyn KeyCustody,
) -> Result<DataKey, KeyWrapError> {
    let raw = B64
        .decode(wrapped.trim())
        .map_err(|e| KeyWrapError::KeyUnwrapFailed(format!("wrapped key is not base64: {}", e)))?;
    let envelope = EncryptedEnvelope::from_wrapped_bytes(&raw)
        .map_err(|e| KeyWrapError::KeyUnwrapFailed(e.to_string()))?;

    let plain = Zeroizing::new(
        custody
            .decrypt(&envelope)
            .await
            .map_err(|e| match e {
                CustodyError::NoSecret | CustodyError::Unavailable(_) => KeyWrapError::Custody(e),
                other => KeyWrapError::KeyUnwrapFailed(other.to_string()),
            })?,
    );
    let key_bytes = Zeroizing::new(
        B64.decode(plain.trim())
            .map_err(|_| KeyWrapError::KeyUnwrapFailed("payload is not base64".into()))?,
    );
    DataKey::from_slice(&key_bytes).map_err(|e| KeyWrapError::KeyUnwrapFailed(e.to_string()))
}
