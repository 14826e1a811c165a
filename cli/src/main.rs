//! datapack: export query results to a selectively-encrypted file pair and back.

use env_logger::{Builder, Env};
use log::error;

mod cli;
mod cmd_export;
mod cmd_import;
mod cmd_keygen;
mod util;

fn init_logger() {
    // RUST_LOG overrides; default is info.
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() {
    init_logger();

    if let Err(e) = cli::run().await {
        error!("{:?}", e);
        std::process::exit(1);
    }
}
