//! config.rs
//! Export/import tunables in one place.
//!
//! `DataPackConfig::from_env()` reads `DATAPACK_*` variables on top of the defaults;
//! fluent `with_*` setters override individual fields afterwards. Key material is never
//! part of the config.

use std::fmt;

use crate::codec::TimestampZone;
use crate::constants::{DEFAULT_CUSTODY_TIMEOUT_MS, DEFAULT_DELIMITER, DEFAULT_FILE_NAME};
use crate::table::is_valid_delimiter;
use crate::utils::is_truthy;

/// How table rows are processed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Strategy {
    #[default]
    Sequential,
    Parallel,
}

impl Strategy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "seq" | "sequential" => Some(Strategy::Sequential),
            "par" | "parallel" => Some(Strategy::Parallel),
            _ => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Sequential => f.write_str("sequential"),
            Strategy::Parallel => f.write_str("parallel"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataPackConfig {
    /// Base name of the exported pair (`<name>.csv`, `<name>.meta.json`).
    /// Env: DATAPACK_FILE_NAME (default "datapack")
    pub file_name: String,

    /// Export everything in the clear and record every column as plain.
    /// Env: DATAPACK_IGNORE_ENCRYPT (default false)
    pub ignore_encrypt: bool,

    /// Emit (and expect on import) a header row of column names.
    /// Env: DATAPACK_HEADER (default false)
    pub include_header: bool,

    /// Cell delimiter.
    /// Env: DATAPACK_DELIMITER (single character, not a hex digit, `x`, `\` or a line
    /// break; default ",")
    pub delimiter: char,

    /// Offset folded into stored timestamps.
    /// Env: DATAPACK_TZ = local | utc | <minutes> (default local)
    pub timestamp_zone: TimestampZone,

    /// Env: DATAPACK_STRATEGY = sequential | parallel (default sequential)
    pub strategy: Strategy,

    /// Worker threads for the parallel strategy; 0 means one per core.
    /// Env: DATAPACK_WORKERS (default 0)
    pub workers: usize,

    /// Bound on each key custody round-trip, enforced by async callers.
    /// Env: DATAPACK_CUSTODY_TIMEOUT_MS (default 60000)
    pub custody_timeout_ms: u64,

    /// Check `FileHash` against the payload on import.
    /// Env: DATAPACK_VERIFY_HASH (default true)
    pub verify_file_hash: bool,
}

impl Default for DataPackConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_FILE_NAME.to_owned(),
            ignore_encrypt: false,
            include_header: false,
            delimiter: DEFAULT_DELIMITER,
            timestamp_zone: TimestampZone::Local,
            strategy: Strategy::Sequential,
            workers: 0,
            custody_timeout_ms: DEFAULT_CUSTODY_TIMEOUT_MS,
            verify_file_hash: true,
        }
    }
}

impl DataPackConfig {
    /// Defaults overridden by any well-formed `DATAPACK_*` variables. Malformed values
    /// are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("DATAPACK_FILE_NAME") {
            let s = v.trim();
            if !s.is_empty() {
                cfg.file_name = s.to_string();
            }
        }

        if let Ok(v) = std::env::var("DATAPACK_IGNORE_ENCRYPT") {
            cfg.ignore_encrypt = is_truthy(&v);
        }

        if let Ok(v) = std::env::var("DATAPACK_HEADER") {
            cfg.include_header = is_truthy(&v);
        }

        if let Ok(v) = std::env::var("DATAPACK_DELIMITER") {
            let mut chars = v.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                if is_valid_delimiter(c) {
                    cfg.delimiter = c;
                }
            }
        }

        if let Ok(v) = std::env::var("DATAPACK_TZ") {
            if let Some(z) = TimestampZone::parse(&v) {
                cfg.timestamp_zone = z;
            }
        }

        if let Ok(v) = std::env::var("DATAPACK_STRATEGY") {
            if let Some(s) = Strategy::parse(&v) {
                cfg.strategy = s;
            }
        }

        if let Ok(v) = std::env::var("DATAPACK_WORKERS") {
            if let Ok(n) = v.trim().parse::<usize>() {
                cfg.workers = n;
            }
        }

        if let Ok(v) = std::env::var("DATAPACK_CUSTODY_TIMEOUT_MS") {
            if let Ok(n) = v.trim().parse::<u64>() {
                cfg.custody_timeout_ms = n;
            }
        }

        if let Ok(v) = std::env::var("DATAPACK_VERIFY_HASH") {
            cfg.verify_file_hash = is_truthy(&v);
        }

        cfg
    }

    pub fn with_file_name<S: Into<String>>(mut self, name: S) -> Self {
        self.file_name = name.into();
        self
    }

    pub fn with_ignore_encrypt(mut self, on: bool) -> Self {
        self.ignore_encrypt = on;
        self
    }

    pub fn with_header(mut self, on: bool) -> Self {
        self.include_header = on;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_timestamp_zone(mut self, zone: TimestampZone) -> Self {
        self.timestamp_zone = zone;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_custody_timeout_ms(mut self, ms: u64) -> Self {
        self.custody_timeout_ms = ms;
        self
    }

    pub fn with_verify_file_hash(mut self, on: bool) -> Self {
        self.verify_file_hash = on;
        self
    }

    /// Worker count after resolving 0 to the core count.
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.workers
        }
    }

    pub fn data_file_name(&self) -> String {
        format!("{}{}", self.file_name, crate::constants::DATA_FILE_EXT)
    }

    pub fn meta_file_name(&self) -> String {
        format!("{}{}", self.file_name, crate::constants::META_FILE_EXT)
    }
}

impl fmt::Display for DataPackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "file_name={}, ignore_encrypt={}, header={}, delimiter={:?}, tz={}, strategy={}, workers={}, custody_timeout_ms={}, verify_hash={}",
            self.file_name,
            self.ignore_encrypt,
            self.include_header,
            self.delimiter,
            self.timestamp_zone,
            self.strategy,
            self.workers,
            self.custody_timeout_ms,
            self.verify_file_hash
        )
    }
}
