//! crypto/cbc.rs
//! AES-128-CBC with PKCS#7 padding.
//!
//! Design notes:
//! - The IV is supplied by the caller and travels in clear inside the cell frame.
//! - Decrypt validates block alignment before touching the cipher.

use aes::Aes128;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::constants::{AES_BLOCK_LEN, IV_LEN};
use crate::crypto::types::{CryptoError, DataKey};

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// Encrypt `plaintext`; output length is the next multiple of 16 strictly above the input.
pub fn aes_cbc_encrypt(key: &DataKey, iv: &[u8; IV_LEN], plaintext: &[u8]) -> Vec<u8> {
    Aes128CbcEnc::new(key.as_bytes().into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

pub fn aes_cbc_decrypt(
    key: &DataKey,
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.is_empty() || ciphertext.len() % AES_BLOCK_LEN != 0 {
        return Err(CryptoError::InvalidCiphertextLen { actual: ciphertext.len() });
    }
    Aes128CbcDec::new(key.as_bytes().into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::Unpad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_always_adds_a_block_when_aligned() {
        let key = DataKey::from_bytes([1u8; 16]);
        let iv = [2u8; 16];
        assert_eq!(aes_cbc_encrypt(&key, &iv, &[]).len(), 16);
        assert_eq!(aes_cbc_encrypt(&key, &iv, &[0u8; 15]).len(), 16);
        assert_eq!(aes_cbc_encrypt(&key, &iv, &[0u8; 16]).len(), 32);
    }

    #[test]
    fn misaligned_ciphertext_is_rejected() {
        let key = DataKey::from_bytes([1u8; 16]);
        let iv = [2u8; 16];
        assert_eq!(
            aes_cbc_decrypt(&key, &iv, &[0u8; 17]),
            Err(CryptoError::InvalidCiphertextLen { actual: 17 })
        );
        assert_eq!(
            aes_cbc_decrypt(&key, &iv, &[]),
            Err(CryptoError::InvalidCiphertextLen { actual: 0 })
        );
    }
}
