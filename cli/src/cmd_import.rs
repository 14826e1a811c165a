use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use datapack_core::config::DataPackConfig;
use datapack_core::datapack::DataPack;
use datapack_core::keywrap::LocalKeyCustody;
use datapack_core::storage::{ContentId, LocalDirStorage};
use log::info;

use crate::util::{read_text, write_text_atomic, TimeoutCustody};

pub enum Source {
    Files { data: PathBuf, meta: PathBuf },
    Store { root: PathBuf, id: String },
}

async fn load_secret(secret_key_file: Option<PathBuf>) -> Result<String> {
    match secret_key_file {
        Some(path) => read_text(&path).await,
        None => std::env::var("DATAPACK_SECRET_KEY")
            .map_err(|_| anyhow!("no secret key: pass --secret-key-file or set DATAPACK_SECRET_KEY")),
    }
}

pub async fn exec(
    source: Source,
    secret_key_file: Option<PathBuf>,
    out: Option<PathBuf>,
    cfg: DataPackConfig,
) -> Result<()> {
    let secret = load_secret(secret_key_file).await?;
    let custody = TimeoutCustody::new(
        LocalKeyCustody::from_secret_base64(&secret).context("secret key")?,
        cfg.custody_timeout_ms,
    );
    let delimiter = cfg.delimiter.to_string();
    let pack = DataPack::new(cfg);

    let result = match source {
        Source::Files { data, meta } => {
            let data = read_text(&data).await?;
            let meta = read_text(&meta).await?;
            pack.import(&data, &meta, &custody).await.context("import")?
        }
        Source::Store { root, id } => {
            let id = ContentId::parse(&id).context("content id")?;
            pack.import_from(&LocalDirStorage::new(root), &id, &custody)
                .await
                .context("import from store")?
        }
    };

    let text: String = result
        .rows
        .iter()
        .map(|r| format!("{}\n", r.join(delimiter.as_str())))
        .collect();

    match out {
        Some(path) => {
            write_text_atomic(&path, &text).await?;
            info!("{} rows from {} written to {}", result.rows.len(), result.file_name, path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}
