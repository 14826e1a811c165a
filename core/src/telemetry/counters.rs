//! telemetry/counters.rs
//! Mutable counters collected while a table is encoded or decoded.
//!
//! Each worker owns its own `CellCounters`; the driver merges them once the workers
//! finish.

use std::fmt;
use std::ops::AddAssign;

#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct CellCounters {
    pub rows: u64,
    pub cells_plain: u64,
    pub cells_encrypted: u64,
    pub cells_decrypted: u64,
    /// Raw cell text bytes that went into (or came out of) encrypted cells.
    pub bytes_plaintext: u64,
    /// Rendered `\x..` cell text bytes.
    pub bytes_ciphertext: u64,
}

impl CellCounters {
    pub fn add_row(&mut self) {
        self.rows += 1;
    }

    pub fn add_plain(&mut self) {
        self.cells_plain += 1;
    }

    pub fn add_encrypt(&mut self, plain_len: usize, cipher_len: usize) {
        self.cells_encrypted += 1;
        self.bytes_plaintext += plain_len as u64;
        self.bytes_ciphertext += cipher_len as u64;
    }

    pub fn add_decrypt(&mut self, cipher_len: usize, plain_len: usize) {
        self.cells_decrypted += 1;
        self.bytes_ciphertext += cipher_len as u64;
        self.bytes_plaintext += plain_len as u64;
    }

    pub fn total_cells(&self) -> u64 {
        self.cells_plain + self.cells_encrypted + self.cells_decrypted
    }

    pub fn merge(&mut self, other: &CellCounters) {
        self.rows += other.rows;
        self.cells_plain += other.cells_plain;
        self.cells_encrypted += other.cells_encrypted;
        self.cells_decrypted += other.cells_decrypted;
        self.bytes_plaintext += other.bytes_plaintext;
        self.bytes_ciphertext += other.bytes_ciphertext;
    }
}

impl AddAssign for CellCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}

impl fmt::Display for CellCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows={} plain={} encrypted={} decrypted={} pt_bytes={} ct_bytes={}",
            self.rows,
            self.cells_plain,
            self.cells_encrypted,
            self.cells_decrypted,
            self.bytes_plaintext,
            self.bytes_ciphertext
        )
    }
}
