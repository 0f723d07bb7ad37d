//! Reference table loaded from one workbook sheet.
//!
//! Column names are truncated at the first ':' and the circuit-number
//! column is coerced to integer keys up front. Both behaviors are quirks
//! of the source data format and are preserved exactly.

use crate::error::WiremarkError;
use crate::model::SerialValue;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// Optional secondary-label column.
pub const GROUP_COLUMN: &str = "SN GROUP";

#[derive(Debug, Clone)]
pub struct ReferenceTable {
    columns: Vec<String>,
    rows: Vec<Vec<Data>>,
    /// Per-row circuit key; `None` for non-numeric cells.
    circuit_keys: Vec<Option<i64>>,
    serial_col: usize,
    group_col: Option<usize>,
}

impl ReferenceTable {
    /// Load one sheet of a workbook. An omitted sheet name means the
    /// workbook's first sheet; a named-but-absent sheet is an error listing
    /// what is available.
    pub fn load(
        path: &Path,
        sheet_name: Option<&str>,
        circuit_column: &str,
        serial_column: &str,
    ) -> Result<ReferenceTable, WiremarkError> {
        let mut workbook = open_workbook_auto(path)
            .map_err(|e| WiremarkError::Workbook(format!("failed to open {}: {e}", path.display())))?;

        let names = workbook.sheet_names().to_owned();
        if names.is_empty() {
            return Err(WiremarkError::EmptyWorkbook);
        }

        let sheet = match sheet_name {
            Some(requested) => {
                if !names.iter().any(|n| n == requested) {
                    return Err(WiremarkError::SheetNotFound {
                        requested: requested.to_string(),
                        available: names,
                    });
                }
                requested.to_string()
            }
            None => names[0].clone(),
        };

        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| WiremarkError::Workbook(format!("failed to read sheet '{sheet}': {e}")))?;

        let mut rows = range.rows();
        let header: Vec<String> = match rows.next() {
            Some(cells) => cells.iter().map(cell_text).collect(),
            None => Vec::new(),
        };
        let body: Vec<Vec<Data>> = rows.map(|r| r.to_vec()).collect();

        ReferenceTable::from_rows(header, body, circuit_column, serial_column)
    }

    /// Build a table from an already-materialized header and rows. Used by
    /// `load` and directly by tests.
    pub fn from_rows(
        header: Vec<String>,
        rows: Vec<Vec<Data>>,
        circuit_column: &str,
        serial_column: &str,
    ) -> Result<ReferenceTable, WiremarkError> {
        let columns: Vec<String> = header.iter().map(|name| normalize_column(name)).collect();

        let circuit_col = find_column(&columns, circuit_column)?;
        let serial_col = find_column(&columns, serial_column)?;
        let group_col = columns.iter().position(|c| c == GROUP_COLUMN);

        let circuit_keys = rows
            .iter()
            .map(|row| row.get(circuit_col).and_then(cell_as_circuit))
            .collect();

        Ok(ReferenceTable {
            columns,
            rows,
            circuit_keys,
            serial_col,
            group_col,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row, in table order, whose circuit key equals `circuit`. When
    /// flag columns are given, the row must also hold a flag value in ANY
    /// of them.
    pub fn find_row(&self, circuit: i64, flag_columns: Option<&[usize]>) -> Option<usize> {
        (0..self.rows.len()).find(|&row| {
            if self.circuit_keys[row] != Some(circuit) {
                return false;
            }
            match flag_columns {
                Some(cols) => cols.iter().any(|&col| self.cell(row, col).is_some_and(is_flag_set)),
                None => true,
            }
        })
    }

    /// Serial value carried by a row, with the "SN GROUP" column when
    /// present.
    pub fn serial_at(&self, row: usize) -> SerialValue {
        let serial = self.cell(row, self.serial_col).map(cell_text).unwrap_or_default();
        let group = self
            .group_col
            .and_then(|col| self.cell(row, col))
            .map(cell_text)
            .filter(|g| !g.is_empty());
        SerialValue::Resolved { serial, group }
    }

    fn cell(&self, row: usize, col: usize) -> Option<&Data> {
        self.rows.get(row).and_then(|r| r.get(col))
    }
}

/// Sheet names of a workbook, for listings and diagnostics.
pub fn sheet_names(path: &Path) -> Result<Vec<String>, WiremarkError> {
    let workbook = open_workbook_auto(path)
        .map_err(|e| WiremarkError::Workbook(format!("failed to open {}: {e}", path.display())))?;
    Ok(workbook.sheet_names().to_owned())
}

/// Keep only the portion before the first ':'.
fn normalize_column(name: &str) -> String {
    name.split(':').next().unwrap_or_default().to_string()
}

fn find_column(columns: &[String], name: &str) -> Result<usize, WiremarkError> {
    columns
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| WiremarkError::ColumnNotFound {
            column: name.to_string(),
            available: columns.to_vec(),
        })
}

/// Coerce a circuit cell to an integer key. Non-numeric cells are missing,
/// not errors.
fn cell_as_circuit(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(i) => Some(*i),
        Data::Float(f) if f.fract() == 0.0 => Some(*f as i64),
        Data::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<i64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

/// Flag columns mark row applicability with a "1" that arrives as text,
/// integer, or float depending on how the sheet was exported.
fn is_flag_set(cell: &Data) -> bool {
    match cell {
        Data::Int(i) => *i == 1,
        Data::Float(f) => *f == 1.0,
        Data::String(s) => matches!(s.trim(), "1" | "1.0"),
        _ => false,
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Empty => String::new(),
        other => format!("{other}"),
    }
}
