//! metadata/types.rs

use serde::{Deserialize, Serialize};

use crate::codec::CodecError;
use crate::constants::META_VERSION;
use crate::keywrap::{CustodyError, KeyWrapError};
use crate::utils::sha256_hex;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetaColumn {
    pub column_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    pub encrypt: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_key_cipher: Option<String>,
}

/// Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetaDataDocument {
    file_name: String,
    file_hash: String,
    ignore_encrypt: bool,
    #[serde(rename = "Column")]
    columns: Vec<MetaColumn>,
    version: String,
}

impl MetaDataDocument {
    pub(crate) fn new(identity: FileIdentity, ignore_encrypt: bool, columns: Vec<MetaColumn>) -> Self {
        Self {
            file_name: identity.file_name,
            file_hash: identity.file_hash,
            ignore_encrypt,
            columns,
            version: META_VERSION.to_owned(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_hash(&self) -> &str {
        &self.file_hash
    }

    pub fn ignore_encrypt(&self) -> bool {
        self.ignore_encrypt
    }

    pub fn columns(&self) -> &[MetaColumn] {
        &self.columns
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn to_json(&self) -> Result<String, MetadataError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, MetadataError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, MetadataError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Name and content hash of the data payload a document describes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileIdentity {
    pub file_name: String,
    pub file_hash: String,
}

impl FileIdentity {
    pub fn new(file_name: impl Into<String>, file_hash: impl Into<String>) -> Self {
        Self { file_name: file_name.into(), file_hash: file_hash.into() }
    }

    /// Identity of `payload` stored under `file_name`.
    pub fn for_payload(file_name: impl Into<String>, payload: &[u8]) -> Self {
        Self::new(file_name, sha256_hex(payload))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("metadata json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported metadata version {found:?} (expected {expected:?})")]
    UnsupportedVersion { found: String, expected: &'static str },

    #[error("column {column:?} is marked encrypted but has no DataKeyCipher")]
    MissingDataKey { column: String },

    #[error("column {column:?} is not encrypted but carries a DataKeyCipher")]
    UnexpectedDataKey { column: String },

    #[error("column {column:?} is encrypted but has no data key")]
    UnkeyedColumn { column: String },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    KeyWrap(#[from] KeyWrapError),

    #[error("key custody: {0}")]
    Custody(#[from] CustodyError),
}
