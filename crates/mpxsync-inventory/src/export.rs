//! Projection of reconciled inventory into the vendor's product import template.

use mpxsync_core::{InventoryItem, LocalStockMap};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::codec::{encode, Cell, SheetRow};
use crate::error::InventoryError;
use crate::reconcile::resolve_stock;

pub const BARCODE: &str = "Barcode";
pub const NAME: &str = "Name";
pub const PURCHASE_PRICE: &str = "PurchasePrice(Unit)";
pub const SALE_PRICE: &str = "SalePrice(Unit)";
/// Spelled `Uint` in the vendor template.
pub const STOCK: &str = "Stock(Uint)";

/// Header row of the Moneypex product import template, in the order the
/// importer expects. Every column must be present even when unused.
pub const EXPORT_COLUMNS: [&str; 33] = [
    BARCODE,
    NAME,
    "Code",
    PURCHASE_PRICE,
    SALE_PRICE,
    "PackSalePrice",
    "CartonSalePrice",
    STOCK,
    "QuantityInPack",
    "PackInCarton",
    "WeightUnits",
    "IsService",
    "ExpireDate",
    "IsAlert",
    "AlertMessage",
    "VATPercentage",
    "IsVAT",
    "IsSalesByQuantity",
    "IsParent",
    "ParentName",
    "CategoryName",
    "Sub Category",
    "Manufacture",
    "DiscountAmount",
    "Discount%",
    "DiscountExpireDate",
    "Description",
    "ShopName",
    "ExpiryAlert",
    "QuantityAlert",
    "TradePrice",
    "TradePackPrice",
    "TradeCartonPrice",
];

/// The five values the import template carries for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    /// Empty when the item has no barcode.
    pub barcode: String,
    pub name: String,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub stock: i64,
}

impl ExportRow {
    /// Expands the row to every template column. Barcode and name are text,
    /// prices and stock numeric, all other columns empty text.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_sheet_row(&self) -> SheetRow {
        let mut row = SheetRow::new();
        for column in EXPORT_COLUMNS {
            let cell = match column {
                BARCODE => Cell::Text(self.barcode.clone()),
                NAME => Cell::Text(self.name.clone()),
                PURCHASE_PRICE => decimal_cell(self.purchase_price),
                SALE_PRICE => decimal_cell(self.sale_price),
                STOCK => Cell::Number(self.stock as f64),
                _ => Cell::empty(),
            };
            row.set(column, cell);
        }
        row
    }
}

/// Builds one export row per item, in input order, with stock resolved
/// against `map`.
#[must_use]
pub fn build_export_rows(items: &[InventoryItem], map: &LocalStockMap) -> Vec<ExportRow> {
    items
        .iter()
        .map(|item| ExportRow {
            barcode: item.barcode().unwrap_or_default().to_owned(),
            name: item.name.clone(),
            purchase_price: item.purchase_price,
            sale_price: item.sale_price,
            stock: resolve_stock(item, map),
        })
        .collect()
}

/// Builds the export rows for `items` and encodes them as an import workbook.
///
/// # Errors
///
/// Returns [`InventoryError::Format`] if the workbook cannot be written.
pub fn build_workbook(
    items: &[InventoryItem],
    map: &LocalStockMap,
) -> Result<Vec<u8>, InventoryError> {
    let rows: Vec<SheetRow> = build_export_rows(items, map)
        .iter()
        .map(ExportRow::to_sheet_row)
        .collect();
    encode(&rows, &EXPORT_COLUMNS)
}

fn decimal_cell(value: Decimal) -> Cell {
    match value.to_f64() {
        Some(number) => Cell::Number(number),
        None => Cell::Text(value.to_string()),
    }
}
