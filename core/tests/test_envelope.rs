// Cell envelope: frame layout, fresh IVs, corruption detection and missing
// key/type handling.

#[cfg(test)]
mod tests {
    use datapack_core::codec::{ColumnType, TimestampZone};
    use datapack_core::column::Column;
    use datapack_core::crypto::{aes_cbc_encrypt, xor_checksum, DataKey};
    use datapack_core::envelope::{
        parse_cipher_text, ChecksumLayer, CipherFrame, EnvelopeEncryptor, EnvelopeError,
    };

    fn enc() -> EnvelopeEncryptor {
        EnvelopeEncryptor::new(TimestampZone::Utc)
    }

    fn render(bytes: &[u8]) -> String {
        format!("\\x{}", hex::encode(bytes))
    }

    // ## 1. Round-trips

    #[test]
    fn all_types_roundtrip_under_random_key() {
        let cases = [
            (ColumnType::Int32, "-2147483648"),
            (ColumnType::Int64, "9007199254740993"),
            (ColumnType::Float32, "0.5"),
            (ColumnType::Float64, "-1234.5678"),
            (ColumnType::Decimal, "3.14159265358979323846264338327950288"),
            (ColumnType::Text, "hello, world"),
            (ColumnType::Timestamp, "1700000000123"),
        ];
        let e = enc();
        for (ty, raw) in cases {
            let column = Column::new("c", ty, true);
            let cell = e.encrypt_cell(raw, &column).unwrap();
            assert_eq!(e.decrypt_cell(&cell, &column).unwrap(), raw, "type {}", ty);
        }
    }

    #[test]
    fn empty_text_roundtrips() {
        let column = Column::new("c", ColumnType::Text, true);
        let cell = enc().encrypt_cell("", &column).unwrap();
        assert_eq!(enc().decrypt_cell(&cell, &column).unwrap(), "");
    }

    // ## 2. Frame format

    #[test]
    fn cell_is_prefixed_lowercase_hex_of_expected_size() {
        let column = Column::new("n", ColumnType::Int32, true);
        let cell = enc().encrypt_cell("42", &column).unwrap();
        assert!(cell.starts_with("\\x"));
        let body = &cell[2..];
        assert!(body.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
        // checksum(1) + iv(16) + one block (4 value bytes + 1 checksum, padded)
        assert_eq!(body.len(), 2 * (1 + 16 + 16));

        let frame = parse_cipher_text(&cell).unwrap();
        assert_eq!(frame.checksum, xor_checksum(&frame.covered(), 1));
        assert_eq!(frame.ciphertext.len(), 16);
    }

    #[test]
    fn fresh_iv_per_cell() {
        let column = Column::new("t", ColumnType::Text, true);
        let a = enc().encrypt_cell("same", &column).unwrap();
        let b = enc().encrypt_cell("same", &column).unwrap();
        assert_ne!(a, b);
        assert_ne!(parse_cipher_text(&a).unwrap().iv, parse_cipher_text(&b).unwrap().iv);
    }

    // ## 3. Corruption

    #[test]
    fn every_single_bit_flip_is_a_checksum_mismatch() {
        let column = Column::new("t", ColumnType::Text, true);
        let cell = enc().encrypt_cell("tamper me", &column).unwrap();
        let bytes = hex::decode(&cell[2..]).unwrap();

        for i in 0..bytes.len() {
            for bit in 0..8 {
                let mut flipped = bytes.clone();
                flipped[i] ^= 1 << bit;
                let err = enc().decrypt_cell(&render(&flipped), &column).unwrap_err();
                assert!(
                    matches!(err, EnvelopeError::ChecksumMismatch { layer: ChecksumLayer::Outer, .. }),
                    "byte {} bit {}: {:?}",
                    i,
                    bit,
                    err
                );
            }
        }
    }

    #[test]
    fn inner_checksum_is_verified_after_decrypt() {
        let key = DataKey::from_bytes([3u8; 16]);
        let column = Column::with_data_key("n", ColumnType::Int32, key.clone());

        let mut plaintext = 42i32.to_le_bytes().to_vec();
        plaintext.push(0xaa); // correct value would be 42
        let iv = [9u8; 16];
        let ciphertext = aes_cbc_encrypt(&key, &iv, &plaintext);
        let mut frame = CipherFrame { checksum: Vec::new(), iv, ciphertext };
        frame.checksum = xor_checksum(&frame.covered(), 1);

        let err = enc().decrypt_cell(&render(&frame.to_bytes()), &column).unwrap_err();
        match err {
            EnvelopeError::ChecksumMismatch { layer, expected, actual } => {
                assert_eq!(layer, ChecksumLayer::Inner);
                assert_eq!(expected, vec![0xaa]);
                assert_eq!(actual, vec![42]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn wrong_key_never_yields_the_plaintext() {
        let right = Column::new("t", ColumnType::Text, true);
        let wrong = Column::new("t", ColumnType::Text, true);
        let cell = enc().encrypt_cell("secret", &right).unwrap();
        match enc().decrypt_cell(&cell, &wrong) {
            Ok(v) => assert_ne!(v, "secret"),
            Err(e) => assert!(!matches!(e, EnvelopeError::ChecksumMismatch { layer: ChecksumLayer::Outer, .. })),
        }
    }

    // ## 4. Missing key / type

    #[test]
    fn missing_data_key() {
        let column = Column::from_parts("t", Some(ColumnType::Text), true, None);
        assert!(matches!(
            enc().encrypt_cell("x", &column),
            Err(EnvelopeError::MissingDataKey { column }) if column == "t"
        ));
        let keyed = Column::new("t", ColumnType::Text, true);
        let cell = enc().encrypt_cell("x", &keyed).unwrap();
        assert!(matches!(
            enc().decrypt_cell(&cell, &column),
            Err(EnvelopeError::MissingDataKey { .. })
        ));
    }

    #[test]
    fn missing_type() {
        let key = DataKey::generate();
        let typed = Column::with_data_key("t", ColumnType::Text, key.clone());
        let untyped = Column::from_parts("t", None, true, Some(key));

        assert!(matches!(enc().encrypt_cell("x", &untyped), Err(EnvelopeError::MissingType { .. })));

        let cell = enc().encrypt_cell("x", &typed).unwrap();
        assert!(matches!(enc().decrypt_cell(&cell, &untyped), Err(EnvelopeError::MissingType { .. })));
    }

    // ## 5. Malformed cells

    #[test]
    fn malformed_cells() {
        let column = Column::new("t", ColumnType::Text, true);
        assert!(matches!(enc().decrypt_cell("00ff", &column), Err(EnvelopeError::MissingPrefix)));
        assert!(matches!(enc().decrypt_cell("\\xzz", &column), Err(EnvelopeError::InvalidHex(_))));
        assert!(matches!(
            enc().decrypt_cell(&render(&[0u8; 20]), &column),
            Err(EnvelopeError::FrameTooShort { min: 33, actual: 20 })
        ));
    }

    #[test]
    fn unparseable_raw_value_fails_before_encryption() {
        let column = Column::new("n", ColumnType::Int32, true);
        assert!(matches!(enc().encrypt_cell("forty-two", &column), Err(EnvelopeError::Codec(_))));
    }

    #[test]
    fn data_key_debug_is_redacted() {
        let key = DataKey::from_bytes([0xab; 16]);
        let dbg = format!("{:?}", key);
        assert!(!dbg.contains("ab"));
        assert_eq!(key.to_hex(), "ab".repeat(16));
    }
}
