//! Spreadsheet-to-inventory pipeline for the Moneypex product export.
//!
//! Everything here is synchronous and free of network I/O: bytes come in from
//! the gateway, typed items and a rebuilt workbook go back out.

pub mod codec;
pub mod error;
pub mod export;
pub mod parse;
pub mod reconcile;

pub use codec::{decode, encode, Cell, RawRow, SheetRow};
pub use error::InventoryError;
pub use export::{build_export_rows, build_workbook, ExportRow, EXPORT_COLUMNS};
pub use parse::{parse_inventory, validate_items};
pub use reconcile::{apply_sales, reconcile, resolve_stock};
