//! datapack-core
//!
//! Pure Rust engine for selectively-encrypted tabular export/import.
//! No async runtime and no wallet UI; key custody is an async trait driven by the host.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod config;
pub mod types;
pub mod utils;

// Cell-level layers
pub mod codec;
pub mod crypto;
pub mod envelope;
pub mod keywrap;

// Schema and document layers
pub mod column;
pub mod metadata;
pub mod telemetry;
pub mod table;

// Orchestration and collaborators
pub mod datapack;
pub mod storage;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::codec::{ColumnType, ScalarValue, Timestamp, TimestampZone, TypedValueCodec};
    pub use crate::column::{columns_from_source, Column, SourceColumn};
    pub use crate::config::{DataPackConfig, Strategy};
    pub use crate::crypto::DataKey;
    pub use crate::datapack::{DataPack, ExportBundle, ImportResult};
    pub use crate::envelope::EnvelopeEncryptor;
    pub use crate::keywrap::{KeyCustody, LocalKeyCustody, RecipientPublicKey};
    pub use crate::metadata::{FileIdentity, MetaDataBuilder, MetaDataDocument};
    pub use crate::storage::{LocalDirStorage, PackStorage};
    pub use crate::table::{Row, TableCodec};
    pub use crate::types::{DataPackError, ErrorKind};
}
