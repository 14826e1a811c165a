use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Lowercase hex SHA-256 over several parts, each prefixed by its u64 LE length.
pub fn sha256_hex_parts(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

/// Parse an env-style boolean ("1|true|on|yes").
pub fn is_truthy(raw: &str) -> bool {
    let s = raw.trim().to_ascii_lowercase();
    s == "1" || s == "true" || s == "on" || s == "yes"
}
