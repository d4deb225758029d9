//! Merging remote and local stock by barcode.

use mpxsync_core::{InventoryItem, LocalStockMap, SaleLine};

use crate::error::InventoryError;

/// Builds the authoritative stock map from the remote catalog and the locally
/// updated items.
///
/// A single fold over `remote` then `updated`: a barcode seen in both ends up
/// with the updated item's stock. Items without a barcode cannot be keyed and
/// are left out.
#[must_use]
pub fn reconcile(remote: &[InventoryItem], updated: &[InventoryItem]) -> LocalStockMap {
    remote
        .iter()
        .chain(updated)
        .filter_map(|item| item.barcode().map(|b| (b, item.stock)))
        .fold(LocalStockMap::new(), |map, (barcode, stock)| {
            map.with(barcode, stock)
        })
}

/// Returns the stock to emit for `item`: its map entry when it has a barcode
/// that was reconciled, otherwise its own carried stock.
#[must_use]
pub fn resolve_stock(item: &InventoryItem, map: &LocalStockMap) -> i64 {
    item.barcode()
        .and_then(|barcode| map.get(barcode))
        .unwrap_or(item.stock)
}

/// Takes confirmed sales out of the reconciled stock.
///
/// Lines are applied in order; every entry of the map must be non-negative
/// once all lines are in.
///
/// # Errors
///
/// - [`InventoryError::Validation`] if a line has a non-positive quantity.
/// - [`InventoryError::UnknownBarcode`] if a line's barcode is not in `map`.
/// - [`InventoryError::NegativeStock`] if any entry ends below zero.
pub fn apply_sales(
    mut map: LocalStockMap,
    sales: &[SaleLine],
) -> Result<LocalStockMap, InventoryError> {
    for (idx, line) in sales.iter().enumerate() {
        if line.quantity <= 0 {
            return Err(InventoryError::Validation {
                row: idx + 1,
                field: "quantity",
                reason: format!("must be positive, got {}", line.quantity),
            });
        }
        if !map.subtract(&line.barcode, line.quantity) {
            return Err(InventoryError::UnknownBarcode(line.barcode.clone()));
        }
    }

    if let Some((barcode, stock)) = map.iter().find(|(_, stock)| *stock < 0) {
        return Err(InventoryError::NegativeStock {
            barcode: barcode.to_owned(),
            stock,
        });
    }

    if !sales.is_empty() {
        tracing::debug!(lines = sales.len(), "applied sales to stock map");
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn item(barcode: Option<&str>, stock: i64) -> InventoryItem {
        InventoryItem {
            name: "Cola".into(),
            product_type: "Drink".into(),
            barcode: barcode.map(str::to_owned),
            sale_price: Decimal::new(250, 2),
            purchase_price: Decimal::new(100, 2),
            stock,
            is_active: true,
        }
    }

    fn sale(barcode: &str, quantity: i64) -> SaleLine {
        SaleLine {
            barcode: barcode.into(),
            quantity,
        }
    }

    #[test]
    fn updated_stock_wins_over_remote() {
        let remote = vec![item(Some("123"), 10), item(Some("456"), 4)];
        let updated = vec![item(Some("123"), 5)];
        let map = reconcile(&remote, &updated);
        assert_eq!(map.get("123"), Some(5));
        assert_eq!(map.get("456"), Some(4));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn later_updated_entry_wins_within_same_source() {
        let updated = vec![item(Some("123"), 5), item(Some("123"), 2)];
        assert_eq!(reconcile(&[], &updated).get("123"), Some(2));
    }

    #[test]
    fn barcodeless_items_are_not_keyed() {
        let remote = vec![item(None, 10), item(Some(""), 3)];
        assert!(reconcile(&remote, &[]).is_empty());
    }

    #[test]
    fn resolve_stock_uses_map_entry() {
        let map = LocalStockMap::new().with("123", 5);
        assert_eq!(resolve_stock(&item(Some("123"), 10), &map), 5);
    }

    #[test]
    fn resolve_stock_falls_back_when_barcode_not_in_map() {
        let map = LocalStockMap::new().with("999", 5);
        assert_eq!(resolve_stock(&item(Some("123"), 10), &map), 10);
    }

    #[test]
    fn resolve_stock_without_barcode_ignores_map() {
        let map = LocalStockMap::new().with("", 1).with("123", 2);
        assert_eq!(resolve_stock(&item(None, 7), &map), 7);
        assert_eq!(resolve_stock(&item(Some(""), 7), &map), 7);
    }

    #[test]
    fn apply_sales_decrements_stock() {
        let map = LocalStockMap::new().with("123", 10).with("456", 1);
        let map = apply_sales(map, &[sale("123", 3), sale("123", 2), sale("456", 1)]).unwrap();
        assert_eq!(map.get("123"), Some(5));
        assert_eq!(map.get("456"), Some(0));
    }

    #[test]
    fn apply_sales_rejects_negative_committed_stock() {
        let map = LocalStockMap::new().with("123", 2);
        let err = apply_sales(map, &[sale("123", 3)]).unwrap_err();
        assert!(
            matches!(err, InventoryError::NegativeStock { ref barcode, stock: -1 } if barcode == "123"),
            "got: {err:?}"
        );
    }

    #[test]
    fn apply_sales_rejects_unknown_barcode() {
        let err = apply_sales(LocalStockMap::new(), &[sale("nope", 1)]).unwrap_err();
        assert!(matches!(err, InventoryError::UnknownBarcode(ref b) if b == "nope"));
    }

    #[test]
    fn apply_sales_rejects_non_positive_quantity() {
        let map = LocalStockMap::new().with("123", 2);
        let err = apply_sales(map, &[sale("123", 0)]).unwrap_err();
        assert!(matches!(err, InventoryError::Validation { field: "quantity", .. }));
    }

    #[test]
    fn apply_sales_rejects_negative_entry_without_sale_line() {
        let map = LocalStockMap::new().with("123", 4).with("456", -7);
        let err = apply_sales(map, &[sale("123", 1)]).unwrap_err();
        assert!(
            matches!(err, InventoryError::NegativeStock { ref barcode, stock: -7 } if barcode == "456"),
            "got: {err:?}"
        );
    }

    #[test]
    fn apply_sales_with_no_lines_is_identity() {
        let map = LocalStockMap::new().with("123", 2);
        assert_eq!(apply_sales(map.clone(), &[]).unwrap(), map);
    }
}
