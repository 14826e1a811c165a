//! metadata/parse.rs
//! Metadata document -> columns, unwrapping keys through custody.

use log::debug;

use crate::codec::ColumnType;
use crate::column::Column;
use crate::constants::META_VERSION;
use crate::keywrap::unwrap_data_key;
use crate::metadata::build::MetaDataBuilder;
use crate::metadata::types::{MetaDataDocument, MetadataError};

impl<'a> MetaDataBuilder<'a> {
    /// Rebuild columns in document order. Fails on the first column that cannot be
    /// restored; no partial column list is returned.
    pub async fn parse(&self, doc: &MetaDataDocument) -> Result<Vec<Column>, MetadataError> {
        if doc.version() != META_VERSION {
            return Err(MetadataError::UnsupportedVersion {
                found: doc.version().to_owned(),
                expected: META_VERSION,
            });
        }

        let mut columns = Vec::with_capacity(doc.columns().len());
        for meta in doc.columns() {
            let column_type = meta
                .data_type
                .as_deref()
                .map(ColumnType::from_name)
                .transpose()?;

            let column = match (meta.encrypt, meta.data_key_cipher.as_deref()) {
                (true, Some(wrapped)) => {
                    let key = unwrap_data_key(wrapped, self.custody()).await?;
                    Column::from_parts(meta.column_name.clone(), column_type, true, Some(key))
                }
                (true, None) => {
                    return Err(MetadataError::MissingDataKey { column: meta.column_name.clone() })
                }
                (false, Some(_)) => {
                    return Err(MetadataError::UnexpectedDataKey { column: meta.column_name.clone() })
                }
                (false, None) => Column::from_parts(meta.column_name.clone(), column_type, false, None),
            };
            columns.push(column);
        }

        debug!("metadata parsed: file={} columns={}", doc.file_name(), columns.len());
        Ok(columns)
    }
}
