//! table/types.rs

use crate::codec::TimestampZone;
use crate::config::{DataPackConfig, Strategy};
use crate::envelope::{EnvelopeEncryptor, EnvelopeError};
use crate::telemetry::CellCounters;

/// One row of cell strings, aligned positionally with the column list.
pub type Row = Vec<String>;

/// Result of a table operation plus the counters collected on the way.
#[derive(Clone, Debug, PartialEq)]
pub struct TableOutput<T> {
    pub output: T,
    pub counters: CellCounters,
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// `row` is the 0-based data row index (header excluded).
    #[error("row {row}: expected {expected} cells, found {actual}")]
    SchemaMismatch { row: usize, expected: usize, actual: usize },

    #[error("header mismatch: expected {expected:?}, found {actual:?}")]
    HeaderMismatch { expected: Vec<String>, actual: Vec<String> },

    #[error("row {row}, column {column:?}: plain cell contains the delimiter or a line break")]
    CellContainsDelimiter { row: usize, column: String },

    #[error("delimiter {0:?} can occur inside encrypted cells or line breaks")]
    InvalidDelimiter(char),

    #[error("column name {column:?} contains the delimiter or a line break")]
    InvalidColumnName { column: String },

    #[error("row {row}, column {column:?}: {source}")]
    Cell {
        row: usize,
        column: String,
        #[source]
        source: EnvelopeError,
    },

    #[error("table worker panicked")]
    WorkerPanicked,
}

/// Encrypted cells are `\x` followed by hex digits, so none of those characters (nor a
/// line break) can separate cells.
pub fn is_valid_delimiter(c: char) -> bool {
    !(c.is_ascii_hexdigit() || matches!(c, 'x' | 'X' | '\\' | '\n' | '\r'))
}

/// Encodes and decodes whole tables for one column schema at a time.
#[derive(Clone, Debug)]
pub struct TableCodec {
    pub(crate) encryptor: EnvelopeEncryptor,
    pub(crate) delimiter: char,
    pub(crate) include_header: bool,
    pub(crate) strategy: Strategy,
    pub(crate) workers: usize,
}

impl Default for TableCodec {
    fn default() -> Self {
        Self::new(TimestampZone::default())
    }
}

impl TableCodec {
    /// Sequential, comma-delimited, no header.
    pub fn new(zone: TimestampZone) -> Self {
        Self {
            encryptor: EnvelopeEncryptor::new(zone),
            delimiter: crate::constants::DEFAULT_DELIMITER,
            include_header: false,
            strategy: Strategy::Sequential,
            workers: 1,
        }
    }

    pub fn from_config(cfg: &DataPackConfig) -> Self {
        Self {
            encryptor: EnvelopeEncryptor::new(cfg.timestamp_zone),
            delimiter: cfg.delimiter,
            include_header: cfg.include_header,
            strategy: cfg.strategy,
            workers: cfg.effective_workers(),
        }
    }

    pub fn with_header(mut self, on: bool) -> Self {
        self.include_header = on;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy, workers: usize) -> Self {
        self.strategy = strategy;
        self.workers = workers.max(1);
        self
    }

    pub fn encryptor(&self) -> &EnvelopeEncryptor {
        &self.encryptor
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub(crate) fn check_delimiter(&self) -> Result<(), TableError> {
        if is_valid_delimiter(self.delimiter) {
            Ok(())
        } else {
            Err(TableError::InvalidDelimiter(self.delimiter))
        }
    }

    pub(crate) fn breaks_layout(&self, cell: &str) -> bool {
        cell.contains(self.delimiter) || cell.contains('\n') || cell.contains('\r')
    }
}
