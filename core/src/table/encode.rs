//! table/encode.rs
//! Rows -> payload text.

use log::debug;

use crate::column::Column;
use crate::config::Strategy;
use crate::table::parallel::{run_parallel, run_sequential};
use crate::table::types::{Row, TableCodec, TableError, TableOutput};
use crate::telemetry::CellCounters;

impl TableCodec {
    /// Encrypt the encrypted columns of every row and render the payload.
    /// Every emitted line is terminated by `\n`.
    pub fn encode_table(&self, rows: &[Row], columns: &[Column]) -> Result<TableOutput<String>, TableError> {
        self.check_delimiter()?;
        let header = if self.include_header { Some(self.header_line(columns)?) } else { None };

        let encode = |i: usize, row: &Row, c: &mut CellCounters| self.encode_row(i, row, columns, c);
        let (lines, counters) = match self.strategy {
            Strategy::Sequential => run_sequential(rows, encode)?,
            Strategy::Parallel => run_parallel(rows, self.workers, encode)?,
        };

        let mut payload = String::new();
        for line in header.into_iter().chain(lines) {
            payload.push_str(&line);
            payload.push('\n');
        }

        debug!("table encoded: {}", counters);
        Ok(TableOutput { output: payload, counters })
    }

    /// Encode one row into its payload line.
    pub fn encode_row(
        &self,
        index: usize,
        row: &Row,
        columns: &[Column],
        counters: &mut CellCounters,
    ) -> Result<String, TableError> {
        if row.len() != columns.len() {
            return Err(TableError::SchemaMismatch {
                row: index,
                expected: columns.len(),
                actual: row.len(),
            });
        }

        let mut cells = Vec::with_capacity(row.len());
        for (cell, column) in row.iter().zip(columns) {
            if column.is_encrypted() {
                let enc = self.encryptor.encrypt_cell(cell, column).map_err(|source| TableError::Cell {
                    row: index,
                    column: column.name().to_owned(),
                    source,
                })?;
                counters.add_encrypt(cell.len(), enc.len());
                cells.push(enc);
            } else {
                if self.breaks_layout(cell) {
                    return Err(TableError::CellContainsDelimiter {
                        row: index,
                        column: column.name().to_owned(),
                    });
                }
                counters.add_plain();
                cells.push(cell.clone());
            }
        }
        counters.add_row();
        Ok(cells.join(self.delimiter.to_string().as_str()))
    }

    pub(crate) fn header_line(&self, columns: &[Column]) -> Result<String, TableError> {
        let mut names = Vec::with_capacity(columns.len());
        for column in columns {
            if self.breaks_layout(column.name()) {
                return Err(TableError::InvalidColumnName { column: column.name().to_owned() });
            }
            names.push(column.name());
        }
        Ok(names.join(self.delimiter.to_string().as_str()))
    }
}
