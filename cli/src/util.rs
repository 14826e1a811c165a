use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use datapack_core::keywrap::{CustodyError, EncryptedEnvelope, KeyCustody, RecipientPublicKey};

/// Bounds every custody round-trip with a tokio timeout. An elapsed timeout fails the
/// call, which fails the whole build or parse.
pub struct TimeoutCustody<C> {
    inner: C,
    timeout: Duration,
}

impl<C: KeyCustody> TimeoutCustody<C> {
    pub fn new(inner: C, timeout_ms: u64) -> Self {
        Self { inner, timeout: Duration::from_millis(timeout_ms) }
    }
}

#[async_trait]
impl<C: KeyCustody> KeyCustody for TimeoutCustody<C> {
    async fn encryption_public_key(&self) -> Result<RecipientPublicKey, CustodyError> {
        tokio::time::timeout(self.timeout, self.inner.encryption_public_key())
            .await
            .map_err(|_| CustodyError::Unavailable(format!("timed out after {:?}", self.timeout)))?
    }

    async fn decrypt(&self, envelope: &EncryptedEnvelope) -> Result<String, CustodyError> {
        tokio::time::timeout(self.timeout, self.inner.decrypt(envelope))
            .await
            .map_err(|_| CustodyError::Unavailable(format!("timed out after {:?}", self.timeout)))?
    }
}

pub async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()))
}

/// Write via a sibling temp file and rename, so a reader never sees a partial file.
pub async fn write_text_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    tokio::fs::write(&tmp, contents)
        .await
        .with_context(|| format!("write {}", Path::new(&tmp).display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("rename -> {}", path.display()))?;
    Ok(())
}
