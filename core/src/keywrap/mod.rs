//! keywrap/mod.rs
//! Asymmetric wrapping of column data keys (x25519-xsalsa20-poly1305 box).
//!
//! Wire form of a wrapped key: `base64(ephem_public[32] || nonce[24] || box_ciphertext)`.
//! The boxed plaintext is the UTF-8 of `base64(data_key)`, matching what wallet
//! `eth_decrypt` style custody returns.

pub mod types;
pub mod custody;
pub mod wrap;

pub use types::*;
pub use custody::*;
pub use wrap::*;
