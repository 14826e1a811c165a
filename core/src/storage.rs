//! storage.rs
//! Content-addressed storage collaborator for exported (data, metadata) pairs.
//!
//! `LocalDirStorage` layout:
//!
//! ```text
//! <root>/<content-id>/<name>.csv
//! <root>/<content-id>/<name>.meta.json
//! <root>/<content-id>/pack.json
//! ```
//!
//! The content id is the sha256 hex of `len(data) || data || len(metadata_json) ||
//! metadata_json`, lengths as u64 little-endian. A pair is staged in a
//! temporary sibling directory and renamed into place, so a visible id directory is
//! always complete. Saving identical content twice is a no-op.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::constants::{DATA_FILE_EXT, META_FILE_EXT};
use crate::utils::sha256_hex_parts;

const MANIFEST_FILE: &str = "pack.json";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId(String);

impl ContentId {
    pub fn for_pair(data: &[u8], metadata_json: &[u8]) -> Self {
        Self(sha256_hex_parts(&[data, metadata_json]))
    }

    /// Accepts only 64 lowercase hex characters.
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        let s = s.trim();
        if s.len() == 64 && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)) {
            Ok(Self(s.to_owned()))
        } else {
            Err(StorageError::InvalidId(s.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredPack {
    pub name: String,
    pub data: String,
    pub metadata_json: String,
}

/// Backend accepting a (data, metadata) pair keyed by a content identifier.
pub trait PackStorage {
    fn save(&self, name: &str, data: &str, metadata_json: &str) -> Result<ContentId, StorageError>;
    fn load(&self, id: &ContentId) -> Result<StoredPack, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid content id {0:?}")]
    InvalidId(String),

    #[error("invalid pack name {0:?}")]
    InvalidName(String),

    #[error("pack {0} not found")]
    NotFound(ContentId),

    #[error("pack {id} is corrupt: {reason}")]
    Corrupt { id: ContentId, reason: String },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io { path: path.to_path_buf(), source }
}

#[derive(Serialize, Deserialize)]
struct Manifest {
    name: String,
}

/// Stores each pair under its own directory below `root`.
#[derive(Clone, Debug)]
pub struct LocalDirStorage {
    root: PathBuf,
}

impl LocalDirStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn pack_dir(&self, id: &ContentId) -> PathBuf {
        self.root.join(id.as_str())
    }

    fn write_file(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
        let mut f = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(path)
            .map_err(io_err(path))?;
        f.write_all(contents).map_err(io_err(path))?;
        f.sync_all().map_err(io_err(path))?;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), StorageError> {
    let bad = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);
    if bad {
        Err(StorageError::InvalidName(name.to_owned()))
    } else {
        Ok(())
    }
}

impl PackStorage for LocalDirStorage {
    fn save(&self, name: &str, data: &str, metadata_json: &str) -> Result<ContentId, StorageError> {
        validate_name(name)?;
        let id = ContentId::for_pair(data.as_bytes(), metadata_json.as_bytes());
        let dir = self.pack_dir(&id);
        if dir.is_dir() {
            debug!("storage: pack {} already present", id);
            return Ok(id);
        }

        fs::create_dir_all(&self.root).map_err(io_err(&self.root))?;
        let tmp = self.root.join(format!(".{}.tmp", id));
        if tmp.exists() {
            fs::remove_dir_all(&tmp).map_err(io_err(&tmp))?;
        }
        fs::create_dir_all(&tmp).map_err(io_err(&tmp))?;

        Self::write_file(&tmp.join(format!("{}{}", name, DATA_FILE_EXT)), data.as_bytes())?;
        Self::write_file(&tmp.join(format!("{}{}", name, META_FILE_EXT)), metadata_json.as_bytes())?;
        let manifest = serde_json::to_vec(&Manifest { name: name.to_owned() }).map_err(|e| {
            StorageError::Corrupt { id: id.clone(), reason: e.to_string() }
        })?;
        Self::write_file(&tmp.join(MANIFEST_FILE), &manifest)?;

        fs::rename(&tmp, &dir).map_err(io_err(&dir))?;
        info!("storage: saved pack {} ({} data bytes) under {}", id, data.len(), dir.display());
        Ok(id)
    }

    fn load(&self, id: &ContentId) -> Result<StoredPack, StorageError> {
        let dir = self.pack_dir(id);
        if !dir.is_dir() {
            return Err(StorageError::NotFound(id.clone()));
        }

        let manifest_path = dir.join(MANIFEST_FILE);
        let raw = fs::read(&manifest_path).map_err(io_err(&manifest_path))?;
        let manifest: Manifest = serde_json::from_slice(&raw)
            .map_err(|e| StorageError::Corrupt { id: id.clone(), reason: e.to_string() })?;
        validate_name(&manifest.name)?;

        let data_path = dir.join(format!("{}{}", manifest.name, DATA_FILE_EXT));
        let meta_path = dir.join(format!("{}{}", manifest.name, META_FILE_EXT));
        let data = fs::read_to_string(&data_path).map_err(io_err(&data_path))?;
        let metadata_json = fs::read_to_string(&meta_path).map_err(io_err(&meta_path))?;

        if ContentId::for_pair(data.as_bytes(), metadata_json.as_bytes()) != *id {
            return Err(StorageError::Corrupt { id: id.clone(), reason: "content id mismatch".into() });
        }
        debug!("storage: loaded pack {}", id);
        Ok(StoredPack { name: manifest.name, data, metadata_json })
    }
}
