//! datapack.rs
//! Export/import orchestration.
//!
//! Export: encode table -> hash payload -> build metadata (wrapping keys) -> serialize.
//! Import: parse metadata (unwrapping keys) -> verify hash -> decode table.
//!
//! Both directions are all-or-nothing: no bundle or rows are returned unless every
//! step succeeded. A `DataPack` holds only configuration; metadata builders and table
//! codecs are created per call.

use log::{debug, info, warn};

use crate::column::Column;
use crate::config::DataPackConfig;
use crate::keywrap::KeyCustody;
use crate::metadata::{FileIdentity, MetaDataBuilder, MetaDataDocument};
use crate::storage::{ContentId, PackStorage};
use crate::table::{Row, TableCodec};
use crate::telemetry::CellCounters;
use crate::types::DataPackError;
use crate::utils::sha256_hex;

/// Hash written by older exporters that hashed a fixed string instead of the payload.
const LEGACY_HASH_INPUT: &[u8] = b"input";

#[derive(Clone, Debug)]
pub struct ExportBundle {
    pub data_file_name: String,
    pub meta_file_name: String,
    pub data: String,
    pub metadata: MetaDataDocument,
    pub metadata_json: String,
    pub counters: CellCounters,
}

#[derive(Clone, Debug)]
pub struct ImportResult {
    pub file_name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub counters: CellCounters,
}

#[derive(Clone, Debug, Default)]
pub struct DataPack {
    config: DataPackConfig,
}

impl DataPack {
    pub fn new(config: DataPackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DataPackConfig {
        &self.config
    }

    pub async fn export(
        &self,
        rows: &[Row],
        columns: &[Column],
        custody: &dyn KeyCustody,
    ) -> Result<ExportBundle, DataPackError> {
        let cfg = &self.config;
        info!("export start: rows={} columns={} ({})", rows.len(), columns.len(), cfg);

        let plain_columns;
        let effective: &[Column] = if cfg.ignore_encrypt {
            plain_columns = columns.iter().map(Column::as_plain).collect::<Vec<_>>();
            &plain_columns
        } else {
            columns
        };

        let table = TableCodec::from_config(cfg).encode_table(rows, effective)?;
        let data = table.output;

        let identity = FileIdentity::for_payload(cfg.data_file_name(), data.as_bytes());
        let metadata = MetaDataBuilder::new(custody)
            .ignore_encrypt(cfg.ignore_encrypt)
            .build(columns, identity)
            .await?;
        let metadata_json = metadata.to_json()?;

        info!(
            "export done: file={} hash={} {}",
            metadata.file_name(),
            metadata.file_hash(),
            table.counters
        );
        Ok(ExportBundle {
            data_file_name: cfg.data_file_name(),
            meta_file_name: cfg.meta_file_name(),
            data,
            metadata,
            metadata_json,
            counters: table.counters,
        })
    }

    pub async fn import(
        &self,
        data: &str,
        metadata_json: &str,
        custody: &dyn KeyCustody,
    ) -> Result<ImportResult, DataPackError> {
        let cfg = &self.config;
        let doc = MetaDataDocument::from_json(metadata_json)?;
        info!("import start: file={} columns={}", doc.file_name(), doc.columns().len());

        if cfg.verify_file_hash {
            self.verify_hash(&doc, data)?;
        }

        let columns = MetaDataBuilder::new(custody).parse(&doc).await?;
        let table = TableCodec::from_config(cfg).decode_table(data, &columns)?;

        info!("import done: file={} {}", doc.file_name(), table.counters);
        Ok(ImportResult {
            file_name: doc.file_name().to_owned(),
            columns,
            rows: table.output,
            counters: table.counters,
        })
    }

    /// Export and hand the pair to `storage` under the configured name.
    pub async fn export_to(
        &self,
        storage: &dyn PackStorage,
        rows: &[Row],
        columns: &[Column],
        custody: &dyn KeyCustody,
    ) -> Result<(ExportBundle, ContentId), DataPackError> {
        let bundle = self.export(rows, columns, custody).await?;
        let id = storage.save(&self.config.file_name, &bundle.data, &bundle.metadata_json)?;
        Ok((bundle, id))
    }

    /// Load a stored pair and import it.
    pub async fn import_from(
        &self,
        storage: &dyn PackStorage,
        id: &ContentId,
        custody: &dyn KeyCustody,
    ) -> Result<ImportResult, DataPackError> {
        let stored = storage.load(id)?;
        debug!("import_from: id={} name={}", id, stored.name);
        self.import(&stored.data, &stored.metadata_json, custody).await
    }

    fn verify_hash(&self, doc: &MetaDataDocument, data: &str) -> Result<(), DataPackError> {
        let actual = sha256_hex(data.as_bytes());
        if doc.file_hash() == actual {
            return Ok(());
        }
        if doc.file_hash() == sha256_hex(LEGACY_HASH_INPUT) {
            warn!("metadata for {} carries a legacy placeholder hash; payload not verified", doc.file_name());
            return Ok(());
        }
        Err(DataPackError::FileHashMismatch { expected: doc.file_hash().to_owned(), actual })
    }
}
