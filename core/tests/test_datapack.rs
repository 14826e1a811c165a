// Export/import orchestration and the content-addressed storage collaborator.

#[cfg(test)]
mod tests {
    use datapack_core::prelude::*;
    use datapack_core::storage::{ContentId, StorageError};
    use datapack_core::utils::sha256_hex;
    use pollster::block_on;
    use serde_json::Value;

    fn custody() -> LocalKeyCustody {
        LocalKeyCustody::from_secret_bytes([7u8; 32])
    }

    fn columns() -> Vec<Column> {
        let refs = vec![
            SourceColumn::new("id", 1, false),
            SourceColumn::new("email", 6, true),
            SourceColumn::new("balance", 5, true),
            SourceColumn::new("created", 7, false),
        ];
        columns_from_source(&refs).unwrap()
    }

    fn rows() -> Vec<Row> {
        vec![
            vec!["1".into(), "a@example.com".into(), "1000000000000000000000.01".into(), "1700000000000".into()],
            vec!["2".into(), "b@example.com".into(), "-0.5".into(), "1700000000001".into()],
        ]
    }

    fn pack() -> DataPack {
        DataPack::new(DataPackConfig::default().with_timestamp_zone(TimestampZone::Utc))
    }

    // ## 1. Round-trip

    #[test]
    fn export_with_public_key_only_then_import() {
        let exporter = LocalKeyCustody::public_only(custody().public_key());
        let bundle = block_on(pack().export(&rows(), &columns(), &exporter)).unwrap();

        assert_eq!(bundle.data_file_name, "datapack.csv");
        assert_eq!(bundle.meta_file_name, "datapack.meta.json");
        assert_eq!(bundle.metadata.file_name(), "datapack.csv");
        assert_eq!(bundle.metadata.file_hash(), sha256_hex(bundle.data.as_bytes()));
        assert!(!bundle.data.contains("a@example.com"));
        assert_eq!(bundle.counters.cells_encrypted, 4);

        let imported = block_on(pack().import(&bundle.data, &bundle.metadata_json, &custody())).unwrap();
        assert_eq!(imported.rows, rows());
        assert_eq!(imported.file_name, "datapack.csv");
        let names: Vec<&str> = imported.columns.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["id", "email", "balance", "created"]);
        assert_eq!(imported.counters.cells_decrypted, 4);
    }

    #[test]
    fn parallel_and_header_config_roundtrip() {
        let cfg = DataPackConfig::default()
            .with_file_name("orders")
            .with_header(true)
            .with_strategy(Strategy::Parallel)
            .with_workers(3)
            .with_timestamp_zone(TimestampZone::FixedMinutes(-480));
        let p = DataPack::new(cfg);
        let bundle = block_on(p.export(&rows(), &columns(), &custody())).unwrap();
        assert_eq!(bundle.data_file_name, "orders.csv");
        assert!(bundle.data.starts_with("id,email,balance,created\n"));
        let imported = block_on(p.import(&bundle.data, &bundle.metadata_json, &custody())).unwrap();
        assert_eq!(imported.rows, rows());
    }

    // ## 2. Ignore encrypt

    #[test]
    fn ignore_encrypt_exports_everything_in_clear() {
        let p = DataPack::new(DataPackConfig::default().with_ignore_encrypt(true));
        let bundle = block_on(p.export(&rows(), &columns(), &custody())).unwrap();
        assert!(bundle.data.contains("a@example.com"));
        assert!(bundle.metadata.ignore_encrypt());
        assert!(bundle.metadata.columns().iter().all(|c| !c.encrypt && c.data_key_cipher.is_none()));

        let json: Value = serde_json::from_str(&bundle.metadata_json).unwrap();
        assert_eq!(json["IgnoreEncrypt"], true);

        let imported = block_on(p.import(&bundle.data, &bundle.metadata_json, &custody())).unwrap();
        assert_eq!(imported.rows, rows());
    }

    // ## 3. Integrity

    #[test]
    fn tampered_payload_is_file_hash_mismatch() {
        let bundle = block_on(pack().export(&rows(), &columns(), &custody())).unwrap();
        let tampered = bundle.data.replacen("1,", "9,", 1);
        let err = block_on(pack().import(&tampered, &bundle.metadata_json, &custody())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileHashMismatch);

        let lax = DataPack::new(
            DataPackConfig::default()
                .with_timestamp_zone(TimestampZone::Utc)
                .with_verify_file_hash(false),
        );
        let imported = block_on(lax.import(&tampered, &bundle.metadata_json, &custody())).unwrap();
        assert_eq!(imported.rows[0][0], "9");
    }

    #[test]
    fn legacy_placeholder_hash_is_accepted() {
        let bundle = block_on(pack().export(&rows(), &columns(), &custody())).unwrap();
        let mut json: Value = serde_json::from_str(&bundle.metadata_json).unwrap();
        json["FileHash"] = sha256_hex(b"input").into();
        let imported = block_on(pack().import(&bundle.data, &json.to_string(), &custody())).unwrap();
        assert_eq!(imported.rows, rows());
    }

    #[test]
    fn wrong_custody_fails_import() {
        let bundle = block_on(pack().export(&rows(), &columns(), &custody())).unwrap();
        let other = LocalKeyCustody::from_secret_bytes([1u8; 32]);
        let err = block_on(pack().import(&bundle.data, &bundle.metadata_json, &other)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyUnwrapFailed);
    }

    #[test]
    fn schema_mismatch_fails_export_atomically() {
        let mut bad = rows();
        bad[1].pop();
        let err = block_on(pack().export(&bad, &columns(), &custody())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }

    // ## 4. Storage

    #[test]
    fn storage_roundtrip_and_dedup() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalDirStorage::new(dir.path());
        let p = pack();

        let (bundle, id) = block_on(p.export_to(&storage, &rows(), &columns(), &custody())).unwrap();
        assert_eq!(id, ContentId::for_pair(bundle.data.as_bytes(), bundle.metadata_json.as_bytes()));
        assert!(dir.path().join(id.as_str()).join("datapack.csv").is_file());
        assert!(dir.path().join(id.as_str()).join("datapack.meta.json").is_file());

        let again = storage.save("datapack", &bundle.data, &bundle.metadata_json).unwrap();
        assert_eq!(again, id);

        let imported = block_on(p.import_from(&storage, &id, &custody())).unwrap();
        assert_eq!(imported.rows, rows());
    }

    #[test]
    fn storage_detects_corruption_and_missing_packs() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalDirStorage::new(dir.path());
        let id = storage.save("pack", "a,b", "{}").unwrap();

        std::fs::write(dir.path().join(id.as_str()).join("pack.csv"), "a,c").unwrap();
        assert!(matches!(storage.load(&id), Err(StorageError::Corrupt { .. })));

        let missing = ContentId::parse(&"0".repeat(64)).unwrap();
        assert!(matches!(storage.load(&missing), Err(StorageError::NotFound(_))));
        assert!(matches!(ContentId::parse("xyz"), Err(StorageError::InvalidId(_))));
        assert!(matches!(storage.save("../escape", "a", "{}"), Err(StorageError::InvalidName(_))));
    }

    #[test]
    fn content_id_separates_data_from_metadata() {
        let a = ContentId::for_pair(b"ab", b"c");
        let b = ContentId::for_pair(b"a", b"bc");
        assert_ne!(a, b);
        assert_ne!(ContentId::for_pair(b"", b"abc"), ContentId::for_pair(b"abc", b""));

        let dir = tempfile::tempdir().unwrap();
        let storage = LocalDirStorage::new(dir.path());
        let first = storage.save("pack", "ab", "c").unwrap();
        let second = storage.save("pack", "a", "bc").unwrap();
        assert_ne!(first, second);
        assert_eq!(storage.load(&first).unwrap().data, "ab");
        assert_eq!(storage.load(&second).unwrap().metadata_json, "bc");
    }
}
