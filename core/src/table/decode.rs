//! table/decode.rs
//! Payload text -> rows.

use log::debug;

use crate::column::Column;
use crate::config::Strategy;
use crate::table::parallel::{run_parallel, run_sequential};
use crate::table::types::{Row, TableCodec, TableError, TableOutput};
use crate::telemetry::CellCounters;

impl TableCodec {
    /// Split the payload, check the header if one is expected, decrypt encrypted columns.
    ///
    /// Lines are `\n`-terminated; exactly one terminator is removed from the end, and a
    /// final line without one is still read. `\r\n` line endings are accepted. An empty
    /// payload holds no rows.
    pub fn decode_table(&self, payload: &str, columns: &[Column]) -> Result<TableOutput<Vec<Row>>, TableError> {
        self.check_delimiter()?;
        let mut lines: Vec<&str> = if payload.is_empty() {
            Vec::new()
        } else {
            let body = payload.strip_suffix('\n').unwrap_or(payload);
            body.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)).collect()
        };

        if self.include_header {
            let expected: Vec<String> = columns.iter().map(|c| c.name().to_owned()).collect();
            if lines.is_empty() {
                return Err(TableError::HeaderMismatch { expected, actual: Vec::new() });
            }
            let header = lines.remove(0);
            let actual: Vec<String> = header.split(self.delimiter).map(str::to_owned).collect();
            if actual != expected {
                return Err(TableError::HeaderMismatch { expected, actual });
            }
        }

        let decode = |i: usize, line: &&str, c: &mut CellCounters| self.decode_row(i, line, columns, c);
        let (rows, counters) = match self.strategy {
            Strategy::Sequential => run_sequential(&lines, decode)?,
            Strategy::Parallel => run_parallel(&lines, self.workers, decode)?,
        };

        debug!("table decoded: {}", counters);
        Ok(TableOutput { output: rows, counters })
    }

    /// Decode one payload line.
    pub fn decode_row(
        &self,
        index: usize,
        line: &str,
        columns: &[Column],
        counters: &mut CellCounters,
    ) -> Result<Row, TableError> {
        let cells: Vec<&str> = line.split(self.delimiter).collect();
        if cells.len() != columns.len() {
            return Err(TableError::SchemaMismatch {
                row: index,
                expected: columns.len(),
                actual: cells.len(),
            });
        }

        let mut row = Vec::with_capacity(cells.len());
        for (cell, column) in cells.into_iter().zip(columns) {
            if column.is_encrypted() {
                let plain = self.encryptor.decrypt_cell(cell, column).map_err(|source| TableError::Cell {
                    row: index,
                    column: column.name().to_owned(),
                    source,
                })?;
                counters.add_decrypt(cell.len(), plain.len());
                row.push(plain);
            } else {
                counters.add_plain();
                row.push(cell.to_owned());
            }
        }
        counters.add_row();
        Ok(row)
    }
}
