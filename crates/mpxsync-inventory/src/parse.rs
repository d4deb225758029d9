//! Validation of decoded export rows into [`InventoryItem`]s.
//!
//! The Moneypex export is stringly typed: prices and stock arrive as numeric
//! strings and the active flag as `"Yes"`/`"No"`. A batch is accepted whole
//! or not at all.

use std::str::FromStr;

use mpxsync_core::InventoryItem;
use rust_decimal::Decimal;

use crate::codec::RawRow;
use crate::error::InventoryError;

/// Column names of the vendor's product export.
pub mod columns {
    pub const NAME: &str = "Name";
    pub const TYPE: &str = "Type";
    pub const BARCODE: &str = "Barcode";
    pub const SALE_PRICE: &str = "SalePrice";
    pub const PURCHASE_PRICE: &str = "PurchasePrice";
    pub const STOCK: &str = "Stock";
    pub const IS_ACTIVE: &str = "IsActive";
}

/// Parses every row of an export into typed items.
///
/// # Errors
///
/// - [`InventoryError::EmptyBatch`] if `rows` is empty.
/// - [`InventoryError::Validation`] for the first row with a missing or
///   malformed field. No items are returned in that case.
pub fn parse_inventory(rows: &[RawRow]) -> Result<Vec<InventoryItem>, InventoryError> {
    if rows.is_empty() {
        return Err(InventoryError::EmptyBatch);
    }

    let items = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| parse_row(idx + 1, row))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(items = items.len(), "parsed inventory export");
    Ok(items)
}

/// Checks locally supplied items against the same rules parsed rows obey:
/// non-empty name and type, non-negative prices and stock.
///
/// # Errors
///
/// Returns [`InventoryError::Validation`] for the first offending item, with
/// its 1-based position in `items`.
pub fn validate_items(items: &[InventoryItem]) -> Result<(), InventoryError> {
    for (idx, item) in items.iter().enumerate() {
        let invalid = |field: &'static str, reason: String| InventoryError::Validation {
            row: idx + 1,
            field,
            reason,
        };

        if item.name.trim().is_empty() {
            return Err(invalid(columns::NAME, "is empty".into()));
        }
        if item.product_type.trim().is_empty() {
            return Err(invalid(columns::TYPE, "is empty".into()));
        }
        for (field, price) in [
            (columns::SALE_PRICE, item.sale_price),
            (columns::PURCHASE_PRICE, item.purchase_price),
        ] {
            if price.is_sign_negative() && !price.is_zero() {
                return Err(invalid(field, format!("must not be negative, got {price}")));
            }
        }
        if item.stock < 0 {
            return Err(invalid(
                columns::STOCK,
                format!("must not be negative, got {}", item.stock),
            ));
        }
    }
    Ok(())
}

fn parse_row(row_number: usize, row: &RawRow) -> Result<InventoryItem, InventoryError> {
    let invalid = |field: &'static str, reason: String| InventoryError::Validation {
        row: row_number,
        field,
        reason,
    };

    let name = required_text(row, columns::NAME).map_err(|r| invalid(columns::NAME, r))?;
    let product_type = required_text(row, columns::TYPE).map_err(|r| invalid(columns::TYPE, r))?;

    let sale_price =
        required_price(row, columns::SALE_PRICE).map_err(|r| invalid(columns::SALE_PRICE, r))?;
    let purchase_price = required_price(row, columns::PURCHASE_PRICE)
        .map_err(|r| invalid(columns::PURCHASE_PRICE, r))?;
    let stock = required_stock(row).map_err(|r| invalid(columns::STOCK, r))?;

    let is_active = match row.get(columns::IS_ACTIVE) {
        Some("Yes") => true,
        Some("No") => false,
        Some(other) => {
            return Err(invalid(
                columns::IS_ACTIVE,
                format!("must be \"Yes\" or \"No\", got \"{other}\""),
            ))
        }
        None => return Err(invalid(columns::IS_ACTIVE, "is missing".into())),
    };

    let barcode = row
        .get(columns::BARCODE)
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_owned);

    Ok(InventoryItem {
        name,
        product_type,
        barcode,
        sale_price,
        purchase_price,
        stock,
        is_active,
    })
}

fn required_text(row: &RawRow, column: &str) -> Result<String, String> {
    match row.get(column) {
        None => Err("is missing".into()),
        Some(value) if value.trim().is_empty() => Err("is empty".into()),
        Some(value) => Ok(value.to_owned()),
    }
}

fn required_token<'a>(row: &'a RawRow, column: &str) -> Result<&'a str, String> {
    match row.get(column).map(str::trim) {
        None => Err("is missing".into()),
        Some("") => Err("is empty".into()),
        Some(token) => Ok(token),
    }
}

fn required_price(row: &RawRow, column: &str) -> Result<Decimal, String> {
    let token = required_token(row, column)?;
    let value = parse_decimal(token).ok_or_else(|| format!("\"{token}\" is not a number"))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(format!("must not be negative, got {value}"));
    }
    Ok(value)
}

/// Stock is a base-10 integer. Decimal tokens with a zero fraction
/// (`"10.00"`) are accepted as the integer they spell.
fn required_stock(row: &RawRow) -> Result<i64, String> {
    let token = required_token(row, columns::STOCK)?;

    let stock = match token.parse::<i64>() {
        Ok(stock) => stock,
        Err(_) => {
            let value =
                parse_decimal(token).ok_or_else(|| format!("\"{token}\" is not a number"))?;
            if !value.fract().is_zero() {
                return Err(format!("\"{token}\" is not a whole quantity"));
            }
            i64::try_from(value).map_err(|_| format!("\"{token}\" is out of range"))?
        }
    };

    if stock < 0 {
        return Err(format!("must not be negative, got {stock}"));
    }
    Ok(stock)
}

fn parse_decimal(token: &str) -> Option<Decimal> {
    Decimal::from_str(token)
        .or_else(|_| Decimal::from_scientific(token))
        .ok()
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
