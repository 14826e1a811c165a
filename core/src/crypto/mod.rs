//! crypto/mod.rs
//! Symmetric primitives for cell frames: data keys, IVs, AES-128-CBC and XOR checksums.

pub mod types;
pub mod cbc;
pub mod checksum;

pub use types::*;
pub use cbc::*;
pub use checksum::*;
