//! metadata/mod.rs
//! Side-car metadata document: per-column type, encryption flag and wrapped key.
//!
//! JSON shape:
//!
//! ```json
//! {"FileName":"datapack.csv","FileHash":"<sha256 hex>","IgnoreEncrypt":false,
//!  "Column":[{"ColumnName":"id","DataType":"int4","Encrypt":false},
//!            {"ColumnName":"note","DataType":"text","Encrypt":true,"DataKeyCipher":"<base64>"}],
//!  "Version":"1.0"}
//! ```
//!
//! Column order in the document is authoritative.

pub mod types;
pub mod build;
pub mod parse;

pub use types::*;
pub use build::*;
