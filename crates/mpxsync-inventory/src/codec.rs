//! Workbook bytes to rows and back.
//!
//! Decoding is schema-agnostic: the first sheet's header row names the keys
//! of every [`RawRow`]. Encoding writes a single sheet in a caller-supplied
//! column order so vendor templates can be reproduced exactly.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::{Workbook, XlsxError};

use crate::error::InventoryError;

/// Name given to the single sheet of an encoded workbook.
pub const SHEET_NAME: &str = "Sheet1";

/// One decoded data row, keyed by header text.
///
/// Every header of the sheet is a key. An empty cell maps to `None`; a cell
/// holding an empty string maps to `Some("")`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: HashMap<String, Option<String>>,
}

impl RawRow {
    /// Returns the cell text for `column`, or `None` when the cell is empty or
    /// the column does not exist in the sheet.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).and_then(Option::as_deref)
    }

    /// Returns `true` if the sheet had a `column` header, even when this row's
    /// cell is empty.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for RawRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, Option<V>)>>(iter: T) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.map(Into::into)))
                .collect(),
        }
    }
}

/// A value to write into an encoded sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    #[must_use]
    pub fn empty() -> Self {
        Cell::Text(String::new())
    }
}

/// One row to encode, keyed by column name. Columns without a key are
/// written as blank cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    cells: HashMap<String, Cell>,
}

impl SheetRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, cell: Cell) {
        self.cells.insert(column.into(), cell);
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }
}

/// Decodes the first sheet of a workbook into rows keyed by the header row.
///
/// The format (xlsx, xls, xlsb, ods) is detected from the bytes. The first
/// sheet in document order is used whatever its name. Rows whose cells are
/// all empty are skipped; blank header cells are ignored and for a repeated
/// header the leftmost column wins.
///
/// # Errors
///
/// Returns [`InventoryError::Format`] if the bytes are not a readable
/// workbook or the workbook has no sheets.
pub fn decode(bytes: &[u8]) -> Result<Vec<RawRow>, InventoryError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| InventoryError::Format(format!("not a readable workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| InventoryError::Format("workbook contains no sheets".into()))?
        .map_err(|e| InventoryError::Format(format!("first sheet is unreadable: {e}")))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        tracing::debug!("first sheet is empty");
        return Ok(Vec::new());
    };

    let columns = header_columns(header);

    let decoded: Vec<RawRow> = rows
        .filter(|cells| cells.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|cells| {
            columns
                .iter()
                .map(|(idx, name)| (name.clone(), cells.get(*idx).and_then(cell_text)))
                .collect()
        })
        .collect();

    tracing::debug!(
        columns = columns.len(),
        rows = decoded.len(),
        "decoded workbook"
    );
    Ok(decoded)
}

/// Encodes `rows` into a single-sheet xlsx workbook with exactly `columns`
/// as the header row, in that order.
///
/// # Errors
///
/// Returns [`InventoryError::Format`] if the sheet limits are exceeded or
/// the workbook cannot be serialized.
pub fn encode(rows: &[SheetRow], columns: &[&str]) -> Result<Vec<u8>, InventoryError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(write_error)?;

    for (col, name) in columns.iter().enumerate() {
        sheet
            .write_string(0, column_number(col)?, *name)
            .map_err(write_error)?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let row_number = u32::try_from(idx + 1)
            .map_err(|_| InventoryError::Format(format!("row {idx} exceeds sheet limits")))?;
        for (col, name) in columns.iter().enumerate() {
            let col = column_number(col)?;
            match row.get(name) {
                Some(Cell::Text(text)) => {
                    sheet
                        .write_string(row_number, col, text.as_str())
                        .map_err(write_error)?;
                }
                Some(Cell::Number(value)) => {
                    sheet
                        .write_number(row_number, col, *value)
                        .map_err(write_error)?;
                }
                None => {}
            }
        }
    }

    workbook.save_to_buffer().map_err(write_error)
}

/// Header text per column index, skipping blanks and repeated names.
fn header_columns(header: &[Data]) -> Vec<(usize, String)> {
    let mut seen = std::collections::HashSet::new();
    header
        .iter()
        .enumerate()
        .filter_map(|(idx, cell)| {
            let name = cell_text(cell)?.trim().to_string();
            if name.is_empty() || !seen.insert(name.clone()) {
                return None;
            }
            Some((idx, name))
        })
        .collect()
}

/// Renders a cell as text; `None` for an empty cell.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        other => Some(other.to_string()),
    }
}

fn column_number(col: usize) -> Result<u16, InventoryError> {
    u16::try_from(col)
        .map_err(|_| InventoryError::Format(format!("column {col} exceeds sheet limits")))
}

#[allow(clippy::needless_pass_by_value)]
fn write_error(err: XlsxError) -> InventoryError {
    InventoryError::Format(format!("failed to write workbook: {err}"))
}
