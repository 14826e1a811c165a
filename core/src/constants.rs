/// Data-encryption-key length (AES-128).
pub const DEK_LEN: usize = 16;

/// CBC initialization vector length.
pub const IV_LEN: usize = 16;

/// AES block size; CBC ciphertext is always a non-zero multiple of it.
pub const AES_BLOCK_LEN: usize = 16;

/// Width of both cell checksums (inner and outer).
pub const CHECKSUM_WIDTH: usize = 1;

/// Prefix of an encrypted cell in the text payload (bytea-style hex literal).
pub const CIPHER_HEX_PREFIX: &str = "\\x";

/// Microseconds between 1970-01-01T00:00:00Z and 2000-01-01T00:00:00Z.
pub const PG_EPOCH_OFFSET_MICROS: i64 = 946_684_800_000_000;

/// Metadata document schema version written and accepted.
pub const META_VERSION: &str = "1.0";

/// File naming defaults.
pub const DEFAULT_FILE_NAME: &str = "datapack";
pub const DATA_FILE_EXT: &str = ".csv";
pub const META_FILE_EXT: &str = ".meta.json";

/// Cell delimiter in the text payload.
pub const DEFAULT_DELIMITER: char = ',';

/// Largest decimal exponent magnitude accepted; plain rendering grows with it.
pub const DECIMAL_MAX_EXPONENT: u64 = 4096;

/// Caller-side bound on a single key custody round-trip.
pub const DEFAULT_CUSTODY_TIMEOUT_MS: u64 = 60_000;

/// Column type tags (mirrored in source column refs).
pub mod type_ids {
    pub const INT4: u8 = 1;
    pub const INT8: u8 = 2;
    pub const FLOAT4: u8 = 3;
    pub const FLOAT8: u8 = 4;
    pub const DECIMAL: u8 = 5;
    pub const TEXT: u8 = 6;
    pub const TIMESTAMP: u8 = 7;
}

/// Key wrapping layout (x25519-xsalsa20-poly1305 box).
pub mod wrap {
    pub const VERSION: &str = "x25519-xsalsa20-poly1305";
    pub const PUBLIC_KEY_LEN: usize = 32;
    pub const SECRET_KEY_LEN: usize = 32;
    pub const NONCE_LEN: usize = 24;
    pub const TAG_LEN: usize = 16;
}
