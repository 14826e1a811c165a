// Metadata document: JSON shape, key wrapping on build, unwrapping on parse and
// rejection of inconsistent documents.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use datapack_core::codec::{CodecError, ColumnType};
    use datapack_core::column::Column;
    use datapack_core::keywrap::{
        CustodyError, EncryptedEnvelope, KeyCustody, LocalKeyCustody, RecipientPublicKey,
    };
    use datapack_core::metadata::{FileIdentity, MetaDataBuilder, MetaDataDocument, MetadataError};
    use datapack_core::types::{DataPackError, ErrorKind};
    use pollster::block_on;
    use serde_json::Value;

    /// Delegates to a local custodian and counts public key requests.
    struct CountingCustody {
        inner: LocalKeyCustody,
        key_requests: AtomicUsize,
        fail: bool,
    }

    impl CountingCustody {
        fn new(fail: bool) -> Self {
            Self { inner: LocalKeyCustody::from_secret_bytes([7u8; 32]), key_requests: AtomicUsize::new(0), fail }
        }
    }

    #[async_trait]
    impl KeyCustody for CountingCustody {
        async fn encryption_public_key(&self) -> Result<RecipientPublicKey, CustodyError> {
            self.key_requests.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CustodyError::Unavailable("user rejected".into()));
            }
            self.inner.encryption_public_key().await
        }

        async fn decrypt(&self, envelope: &EncryptedEnvelope) -> Result<String, CustodyError> {
            self.inner.decrypt(envelope).await
        }
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", ColumnType::Int32, false),
            Column::new("note", ColumnType::Text, true),
            Column::new("amount", ColumnType::Decimal, true),
        ]
    }

    fn identity() -> FileIdentity {
        FileIdentity::for_payload("datapack.csv", b"payload")
    }

    fn build(custody: &dyn KeyCustody, cols: &[Column]) -> MetaDataDocument {
        block_on(MetaDataBuilder::new(custody).build(cols, identity())).unwrap()
    }

    // ## 1. Build

    #[test]
    fn json_shape() {
        let custody = CountingCustody::new(false);
        let doc = build(&custody, &columns());
        let json: Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

        assert_eq!(json["FileName"], "datapack.csv");
        assert_eq!(json["FileHash"].as_str().unwrap(), datapack_core::utils::sha256_hex(b"payload"));
        assert_eq!(json["IgnoreEncrypt"], false);
        assert_eq!(json["Version"], "1.0");

        let cols = json["Column"].as_array().unwrap();
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[0]["ColumnName"], "id");
        assert_eq!(cols[0]["DataType"], "int4");
        assert_eq!(cols[0]["Encrypt"], false);
        assert!(cols[0].get("DataKeyCipher").is_none());
        assert_eq!(cols[1]["DataType"], "text");
        assert!(cols[1]["DataKeyCipher"].is_string());
        assert_eq!(cols[2]["DataType"], "decimal");
        assert!(cols[2]["DataKeyCipher"].is_string());
    }

    #[test]
    fn recipient_key_is_requested_once_per_build() {
        let custody = CountingCustody::new(false);
        build(&custody, &columns());
        assert_eq!(custody.key_requests.load(Ordering::SeqCst), 1);

        let plain_only = vec![Column::new("id", ColumnType::Int32, false)];
        let custody = CountingCustody::new(false);
        build(&custody, &plain_only);
        assert_eq!(custody.key_requests.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn ignore_encrypt_records_plain_columns_without_custody() {
        let custody = CountingCustody::new(true);
        let doc = block_on(
            MetaDataBuilder::new(&custody)
                .ignore_encrypt(true)
                .build(&columns(), identity()),
        )
        .unwrap();
        assert!(doc.ignore_encrypt());
        assert!(doc.columns().iter().all(|c| !c.encrypt && c.data_key_cipher.is_none()));
        assert_eq!(custody.key_requests.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn custody_failure_fails_the_whole_build() {
        let custody = CountingCustody::new(true);
        let err = block_on(MetaDataBuilder::new(&custody).build(&columns(), identity())).unwrap_err();
        assert!(matches!(err, MetadataError::Custody(CustodyError::Unavailable(_))));
        assert_eq!(DataPackError::from(err).kind(), ErrorKind::Custody);
    }

    // ## 2. Parse

    #[test]
    fn parse_restores_keys_in_document_order() {
        let custody = CountingCustody::new(false);
        let original = columns();
        let doc = build(&custody, &original);
        let json = doc.to_json().unwrap();

        let parsed_doc = MetaDataDocument::from_json(&json).unwrap();
        assert_eq!(parsed_doc, doc);
        let restored = block_on(MetaDataBuilder::new(&custody).parse(&parsed_doc)).unwrap();
        assert_eq!(restored, original);
    }

    fn tweak(doc: &MetaDataDocument, f: impl FnOnce(&mut Value)) -> MetaDataDocument {
        let mut v: Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        f(&mut v);
        MetaDataDocument::from_json(&v.to_string()).unwrap()
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let custody = CountingCustody::new(false);
        let doc = tweak(&build(&custody, &columns()), |v| v["Version"] = "2.0".into());
        let err = block_on(MetaDataBuilder::new(&custody).parse(&doc)).unwrap_err();
        assert!(matches!(err, MetadataError::UnsupportedVersion { .. }));
        assert_eq!(DataPackError::from(err).kind(), ErrorKind::UnsupportedVersion);
    }

    #[test]
    fn encrypted_column_without_wrapped_key() {
        let custody = CountingCustody::new(false);
        let doc = tweak(&build(&custody, &columns()), |v| {
            v["Column"][1].as_object_mut().unwrap().remove("DataKeyCipher");
        });
        let err = block_on(MetaDataBuilder::new(&custody).parse(&doc)).unwrap_err();
        assert!(matches!(err, MetadataError::MissingDataKey { ref column } if column == "note"));
        assert_eq!(DataPackError::from(err).kind(), ErrorKind::MissingDataKey);
    }

    #[test]
    fn plain_column_with_wrapped_key() {
        let custody = CountingCustody::new(false);
        let doc = tweak(&build(&custody, &columns()), |v| v["Column"][1]["Encrypt"] = false.into());
        let err = block_on(MetaDataBuilder::new(&custody).parse(&doc)).unwrap_err();
        assert!(matches!(err, MetadataError::UnexpectedDataKey { .. }));
    }

    #[test]
    fn unknown_data_type_is_unsupported() {
        let custody = CountingCustody::new(false);
        let doc = tweak(&build(&custody, &columns()), |v| v["Column"][0]["DataType"] = "varchar".into());
        let err = block_on(MetaDataBuilder::new(&custody).parse(&doc)).unwrap_err();
        assert!(matches!(err, MetadataError::Codec(CodecError::UnsupportedType { .. })));
        assert_eq!(DataPackError::from(err).kind(), ErrorKind::UnsupportedType);
    }

    #[test]
    fn absent_data_type_parses_as_untyped_column() {
        let custody = CountingCustody::new(false);
        let doc = tweak(&build(&custody, &columns()), |v| {
            v["Column"][1].as_object_mut().unwrap().remove("DataType");
        });
        let restored = block_on(MetaDataBuilder::new(&custody).parse(&doc)).unwrap();
        assert_eq!(restored[1].column_type(), None);
        assert!(restored[1].data_key().is_some());
    }

    #[test]
    fn wrong_custody_is_key_unwrap_failed() {
        let custody = CountingCustody::new(false);
        let doc = build(&custody, &columns());
        let other = LocalKeyCustody::from_secret_bytes([9u8; 32]);
        let err = block_on(MetaDataBuilder::new(&other).parse(&doc)).unwrap_err();
        assert_eq!(DataPackError::from(err).kind(), ErrorKind::KeyUnwrapFailed);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(MetaDataDocument::from_json("{"), Err(MetadataError::Json(_))));
        assert!(MetaDataDocument::from_json(r#"{"FileName":"x"}"#).is_err());
    }
}
