use std::path::PathBuf;

use anyhow::{anyhow, Result};
use datapack_core::keywrap::LocalKeyCustody;
use log::info;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyPairOut {
    public_key: String,
    secret_key: String,
}

pub async fn exec(out: Option<PathBuf>) -> Result<()> {
    let custody = LocalKeyCustody::generate();
    let pair = KeyPairOut {
        public_key: custody.public_key().to_base64(),
        secret_key: custody
            .secret_key_base64()
            .ok_or_else(|| anyhow!("generated custody has no secret"))?,
    };
    let json = serde_json::to_string_pretty(&pair)?;

    match out {
        Some(path) => {
            crate::util::write_text_atomic(&path, &json).await?;
            info!("keypair written to {} (public {})", path.display(), pair.public_key);
        }
        None => println!("{}", json),
    }
    Ok(())
}
