use thiserror::Error;

#[derive(Debug, Error)]
pub enum InventoryError {
    /// The buffer is not a readable workbook, has no sheets, or could not be written.
    #[error("spreadsheet format error: {0}")]
    Format(String),

    /// The export decoded to zero data rows.
    #[error("inventory export contained no rows")]
    EmptyBatch,

    /// A row failed a required-field or token check. `row` is the 1-based data
    /// row (the header is not counted).
    #[error("invalid inventory row {row}: {field} {reason}")]
    Validation {
        row: usize,
        field: &'static str,
        reason: String,
    },

    #[error("sale references unknown barcode \"{0}\"")]
    UnknownBarcode(String),

    #[error("stock for barcode \"{barcode}\" would be committed negative ({stock})")]
    NegativeStock { barcode: String, stock: i64 },
}
