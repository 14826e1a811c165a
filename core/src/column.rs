//! column.rs
//! Column key model and source schema intake.
//!
//! A column carries its name, declared type, encryption flag and, iff encrypted, a
//! fresh 16-byte data key. Keys are generated at creation and never shared between
//! columns or exports.

use serde::{Deserialize, Serialize};

use crate::codec::{CodecError, ColumnType};
use crate::crypto::DataKey;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    name: String,
    column_type: Option<ColumnType>,
    encrypted: bool,
    data_key: Option<DataKey>,
}

impl Column {
    /// New column; an encrypted column gets a fresh CSPRNG key.
    pub fn new(name: impl Into<String>, column_type: ColumnType, encrypted: bool) -> Self {
        Self {
            name: name.into(),
            column_type: Some(column_type),
            encrypted,
            data_key: encrypted.then(DataKey::generate),
        }
    }

    /// Encrypted column with a caller-provided key.
    pub fn with_data_key(name: impl Into<String>, column_type: ColumnType, key: DataKey) -> Self {
        Self {
            name: name.into(),
            column_type: Some(column_type),
            encrypted: true,
            data_key: Some(key),
        }
    }

    /// Column rebuilt from imported metadata. No invariants are enforced here; the
    /// envelope layer reports a missing key or type when a cell needs one.
    pub fn from_parts(
        name: impl Into<String>,
        column_type: Option<ColumnType>,
        encrypted: bool,
        data_key: Option<DataKey>,
    ) -> Self {
        Self { name: name.into(), column_type, encrypted, data_key }
    }

    /// Same column recorded as plain, key dropped.
    pub fn as_plain(&self) -> Self {
        Self {
            name: self.name.clone(),
            column_type: self.column_type,
            encrypted: false,
            data_key: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> Option<ColumnType> {
        self.column_type
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    pub fn data_key(&self) -> Option<&DataKey> {
        self.data_key.as_ref()
    }
}

/// Column reference as handed over by a query-result source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: u32,
    #[serde(default)]
    pub enc: bool,
}

impl SourceColumn {
    pub fn new(name: impl Into<String>, type_tag: u32, enc: bool) -> Self {
        Self { name: name.into(), type_tag, enc }
    }
}

/// Map source refs to fresh columns. Fails on the first unknown type tag.
pub fn columns_from_source(refs: &[SourceColumn]) -> Result<Vec<Column>, CodecError> {
    refs.iter()
        .map(|r| {
            let ty = ColumnType::from_tag(r.type_tag)?;
            Ok(Column::new(r.name.clone(), ty, r.enc))
        })
        .collect()
}
