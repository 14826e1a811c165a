use std::path::PathBuf;

use anyhow::{Context, Result};
use datapack_core::column::{columns_from_source, SourceColumn};
use datapack_core::config::DataPackConfig;
use datapack_core::datapack::DataPack;
use datapack_core::keywrap::{LocalKeyCustody, RecipientPublicKey};
use datapack_core::storage::{LocalDirStorage, PackStorage};
use datapack_core::table::Row;
use log::info;

use crate::util::{read_text, write_text_atomic, TimeoutCustody};

pub async fn exec(
    rows_path: PathBuf,
    schema_path: PathBuf,
    public_key: String,
    out_dir: Option<PathBuf>,
    store: Option<PathBuf>,
    cfg: DataPackConfig,
) -> Result<()> {
    let refs: Vec<SourceColumn> = serde_json::from_str(&read_text(&schema_path).await?)
        .with_context(|| format!("parse schema {}", schema_path.display()))?;
    let columns = columns_from_source(&refs).context("map schema")?;

    let raw = read_text(&rows_path).await?;
    let rows: Vec<Row> = if raw.is_empty() {
        Vec::new()
    } else {
        raw.strip_suffix('\n')
            .unwrap_or(raw.as_str())
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .map(|l| l.split(cfg.delimiter).map(str::to_owned).collect())
            .collect()
    };

    let recipient = RecipientPublicKey::from_base64(&public_key).context("public key")?;
    let custody = TimeoutCustody::new(LocalKeyCustody::public_only(recipient), cfg.custody_timeout_ms);

    let pack = DataPack::new(cfg);
    let bundle = pack.export(&rows, &columns, &custody).await.context("export")?;

    let dir = out_dir.unwrap_or_else(|| PathBuf::from("."));
    let data_path = dir.join(&bundle.data_file_name);
    let meta_path = dir.join(&bundle.meta_file_name);
    write_text_atomic(&data_path, &bundle.data).await?;
    write_text_atomic(&meta_path, &bundle.metadata_json).await?;
    info!("wrote {} and {}", data_path.display(), meta_path.display());

    if let Some(root) = store {
        let storage = LocalDirStorage::new(root);
        let id = storage
            .save(&pack.config().file_name, &bundle.data, &bundle.metadata_json)
            .context("store pack")?;
        println!("{}", id);
    }
    Ok(())
}
