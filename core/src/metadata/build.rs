//! metadata/build.rs
//! Columns -> metadata document.

use log::debug;

use crate::column::Column;
use crate::keywrap::{wrap_data_key, KeyCustody, RecipientPublicKey};
use crate::metadata::types::{FileIdentity, MetaColumn, MetaDataDocument, MetadataError};

/// Builds and parses metadata documents against one custody capability.
///
/// Constructed per export or import call.
pub struct MetaDataBuilder<'a> {
    custody: &'a dyn KeyCustody,
    ignore_encrypt: bool,
}

impl<'a> MetaDataBuilder<'a> {
    pub fn new(custody: &'a dyn KeyCustody) -> Self {
        Self { custody, ignore_encrypt: false }
    }

    /// Record every column as plain and skip key wrapping entirely.
    pub fn ignore_encrypt(mut self, ignore: bool) -> Self {
        self.ignore_encrypt = ignore;
        self
    }

    pub(crate) fn custody(&self) -> &'a dyn KeyCustody {
        self.custody
    }

    /// One `MetaColumn` per column, in order. The recipient key is fetched once, and
    /// only when some column needs wrapping.
    pub async fn build(
        &self,
        columns: &[Column],
        identity: FileIdentity,
    ) -> Result<MetaDataDocument, MetadataError> {
        let needs_wrap = !self.ignore_encrypt && columns.iter().any(Column::is_encrypted);
        let recipient: Option<RecipientPublicKey> = if needs_wrap {
            Some(self.custody.encryption_public_key().await?)
        } else {
            None
        };

        let mut metas = Vec::with_capacity(columns.len());
        for column in columns {
            let encrypt = column.is_encrypted() && !self.ignore_encrypt;
            let data_key_cipher = match (encrypt, recipient.as_ref()) {
                (true, Some(pk)) => {
                    let key = column
                        .data_key()
                        .ok_or_else(|| MetadataError::UnkeyedColumn { column: column.name().to_owned() })?;
                    Some(wrap_data_key(key, pk)?)
                }
                _ => None,
            };
            metas.push(MetaColumn {
                column_name: column.name().to_owned(),
                data_type: column.column_type().map(|t| t.name().to_owned()),
                encrypt,
                data_key_cipher,
            });
        }

        debug!(
            "metadata built: file={} columns={} wrapped={}",
            identity.file_name,
            metas.len(),
            metas.iter().filter(|m| m.data_key_cipher.is_some()).count()
        );
        Ok(MetaDataDocument::new(identity, self.ignore_encrypt, metas))
    }
}
