//! types.rs
//! Unified error for export/import operations.
//!
//! Each layer keeps its own error enum; `DataPackError` wraps them with `From` impls so
//! `?` works across layers, and `kind()` tells callers which failure class occurred
//! without matching on nested variants.

use std::fmt;

use crate::codec::CodecError;
use crate::crypto::CryptoError;
use crate::envelope::EnvelopeError;
use crate::keywrap::{CustodyError, KeyWrapError};
use crate::metadata::MetadataError;
use crate::storage::StorageError;
use crate::table::TableError;

/// Failure classes. The first six are the core cell/table kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedType,
    MissingDataKey,
    MissingType,
    ChecksumMismatch,
    KeyUnwrapFailed,
    SchemaMismatch,
    /// Value cannot be encoded or decoded as its declared type.
    InvalidValue,
    /// Cell text is not a well-formed `\x..` frame.
    MalformedCell,
    UnsupportedVersion,
    FileHashMismatch,
    /// Caller input that can never be exported or parsed as given.
    InvalidInput,
    Crypto,
    Custody,
    Storage,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DataPackError {
    #[error("codec: {0}")]
    Codec(#[from] CodecError),

    #[error("envelope: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("key wrap: {0}")]
    KeyWrap(#[from] KeyWrapError),

    #[error("key custody: {0}")]
    Custody(#[from] CustodyError),

    #[error("metadata: {0}")]
    Metadata(#[from] MetadataError),

    #[error("table: {0}")]
    Table(#[from] TableError),

    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    #[error("file hash mismatch: metadata={expected}, payload={actual}")]
    FileHashMismatch { expected: String, actual: String },
}

impl DataPackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DataPackError::Codec(e) => codec_kind(e),
            DataPackError::Envelope(e) => envelope_kind(e),
            DataPackError::KeyWrap(e) => keywrap_kind(e),
            DataPackError::Custody(_) => ErrorKind::Custody,
            DataPackError::Metadata(e) => metadata_kind(e),
            DataPackError::Table(e) => table_kind(e),
            DataPackError::Storage(_) => ErrorKind::Storage,
            DataPackError::FileHashMismatch { .. } => ErrorKind::FileHashMismatch,
        }
    }
}

fn codec_kind(e: &CodecError) -> ErrorKind {
    match e {
        CodecError::UnsupportedType { .. } => ErrorKind::UnsupportedType,
        CodecError::TypeMismatch { .. }
        | CodecError::InvalidLength { .. }
        | CodecError::InvalidValue { .. } => ErrorKind::InvalidValue,
    }
}

fn envelope_kind(e: &EnvelopeError) -> ErrorKind {
    match e {
        EnvelopeError::MissingDataKey { .. } => ErrorKind::MissingDataKey,
        EnvelopeError::MissingType { .. } => ErrorKind::MissingType,
        EnvelopeError::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
        EnvelopeError::MissingPrefix
        | EnvelopeError::InvalidHex(_)
        | EnvelopeError::FrameTooShort { .. } => ErrorKind::MalformedCell,
        EnvelopeError::Crypto(CryptoError::InvalidCiphertextLen { .. }) => ErrorKind::MalformedCell,
        EnvelopeError::Crypto(CryptoError::Unpad) => ErrorKind::ChecksumMismatch,
        EnvelopeError::Crypto(_) => ErrorKind::Crypto,
        EnvelopeError::Codec(c) => codec_kind(c),
    }
}

fn keywrap_kind(e: &KeyWrapError) -> ErrorKind {
    match e {
        KeyWrapError::InvalidPublicKey(_) => ErrorKind::InvalidInput,
        KeyWrapError::WrapFailed(_) => ErrorKind::Crypto,
        KeyWrapError::Malformed(_) | KeyWrapError::KeyUnwrapFailed(_) => ErrorKind::KeyUnwrapFailed,
        KeyWrapError::Custody(_) => ErrorKind::Custody,
    }
}

fn metadata_kind(e: &MetadataError) -> ErrorKind {
    match e {
        MetadataError::Json(_) | MetadataError::UnexpectedDataKey { .. } => ErrorKind::InvalidInput,
        MetadataError::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
        MetadataError::MissingDataKey { .. } | MetadataError::UnkeyedColumn { .. } => {
            ErrorKind::MissingDataKey
        }
        MetadataError::Codec(c) => codec_kind(c),
        MetadataError::KeyWrap(k) => keywrap_kind(k),
        MetadataError::Custody(_) => ErrorKind::Custody,
    }
}

fn table_kind(e: &TableError) -> ErrorKind {
    match e {
        TableError::SchemaMismatch { .. } | TableError::HeaderMismatch { .. } => ErrorKind::SchemaMismatch,
        TableError::CellContainsDelimiter { .. }
        | TableError::InvalidColumnName { .. }
        | TableError::InvalidDelimiter(_) => {
            ErrorKind::InvalidInput
        }
        TableError::Cell { source, .. } => envelope_kind(source),
        TableError::WorkerPanicked => ErrorKind::Internal,
    }
}
