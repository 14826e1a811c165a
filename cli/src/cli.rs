use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use datapack_core::config::{DataPackConfig, Strategy};
use datapack_core::codec::TimestampZone;

#[derive(Parser, Debug)]
#[command(
    name = "datapack",
    version,
    about = "Selectively-encrypted tabular export/import",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Generate an x25519 custody keypair (base64).
    Keygen {
        /// Write the keypair JSON here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Encode rows and write `<name>.csv` + `<name>.meta.json`.
    Export {
        /// Raw rows, one `\n`-terminated line each, cells split by the delimiter.
        #[arg(long)]
        rows: PathBuf,
        /// JSON array of `{"name", "type", "enc"}` column refs.
        #[arg(long)]
        schema: PathBuf,
        /// Recipient public key (base64, 32 bytes).
        #[arg(long)]
        public_key: String,
        /// Output directory for the pair.
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Also save the pair into a content-addressed store at this root.
        #[arg(long)]
        store: Option<PathBuf>,
        #[command(flatten)]
        opts: PackOpts,
    },

    /// Decode a pair back to plain rows.
    Import {
        /// Data payload file (ignored with --store/--id).
        #[arg(long, required_unless_present = "id")]
        data: Option<PathBuf>,
        /// Metadata JSON file (ignored with --store/--id).
        #[arg(long, required_unless_present = "id")]
        meta: Option<PathBuf>,
        /// Content-addressed store root.
        #[arg(long, requires = "id")]
        store: Option<PathBuf>,
        /// Content id inside --store.
        #[arg(long, requires = "store")]
        id: Option<String>,
        /// File holding the custody secret key (base64). Falls back to DATAPACK_SECRET_KEY.
        #[arg(long)]
        secret_key_file: Option<PathBuf>,
        /// Write decoded rows here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        opts: PackOpts,
    },
}

/// Options shared by export and import; unset flags fall back to DATAPACK_* env.
#[derive(Args, Debug, Default)]
pub struct PackOpts {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub header: bool,
    #[arg(long)]
    pub ignore_encrypt: bool,
    #[arg(long)]
    pub delimiter: Option<char>,
    /// local | utc | <minutes, getTimezoneOffset style>
    #[arg(long, value_parser = parse_zone)]
    pub tz: Option<TimestampZone>,
    #[arg(long)]
    pub parallel: bool,
    #[arg(long)]
    pub workers: Option<usize>,
    #[arg(long)]
    pub custody_timeout_ms: Option<u64>,
    /// Skip the FileHash check on import.
    #[arg(long)]
    pub no_verify_hash: bool,
}

impl PackOpts {
    pub fn to_config(&self) -> DataPackConfig {
        let mut cfg = DataPackConfig::from_env();
        if let Some(name) = &self.name {
            cfg = cfg.with_file_name(name.clone());
        }
        if self.header {
            cfg = cfg.with_header(true);
        }
        if self.ignore_encrypt {
            cfg = cfg.with_ignore_encrypt(true);
        }
        if let Some(d) = self.delimiter {
            cfg = cfg.with_delimiter(d);
        }
        if let Some(z) = self.tz {
            cfg = cfg.with_timestamp_zone(z);
        }
        if self.parallel {
            cfg = cfg.with_strategy(Strategy::Parallel);
        }
        if let Some(w) = self.workers {
            cfg = cfg.with_workers(w);
        }
        if let Some(ms) = self.custody_timeout_ms {
            cfg = cfg.with_custody_timeout_ms(ms);
        }
        if self.no_verify_hash {
            cfg = cfg.with_verify_file_hash(false);
        }
        cfg
    }
}

fn parse_zone(s: &str) -> Result<TimestampZone, String> {
    TimestampZone::parse(s).ok_or_else(|| format!("invalid timezone {:?}", s))
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Keygen { out } => crate::cmd_keygen::exec(out).await,
        Cmd::Export { rows, schema, public_key, out_dir, store, opts } => {
            crate::cmd_export::exec(rows, schema, public_key, out_dir, store, opts.to_config()).await
        }
        Cmd::Import { data, meta, store, id, secret_key_file, out, opts } => {
            let source = match (store, id) {
                (Some(store), Some(id)) => crate::cmd_import::Source::Store { root: store, id },
                _ => crate::cmd_import::Source::Files {
                    data: data.unwrap_or_default(),
                    meta: meta.unwrap_or_default(),
                },
            };
            crate::cmd_import::exec(source, secret_key_file, out, opts.to_config()).await
        }
    }
}
