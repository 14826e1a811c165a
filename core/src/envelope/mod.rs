//! envelope/mod.rs
//! Per-cell envelope encryption.
//!
//! Frame layout (before hex rendering):
//!
//! ```text
//! checksum2[1] || iv[16] || AES-128-CBC-PKCS7(dek, iv, typed_bytes || checksum1[1])
//! ```
//!
//! `checksum1` covers the typed-encoded plaintext, `checksum2` covers `iv || cipher`.
//! The cell text is `\x` followed by the lowercase hex of the frame.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
