use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog entry from the Moneypex product export, validated and typed.
///
/// Every item in a parsed batch has a non-empty `name` and `product_type`,
/// non-negative prices, and a non-negative `stock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub name: String,
    /// Vendor category, exported in the `Type` column.
    #[serde(rename = "type")]
    pub product_type: String,
    /// Product barcode; the reconciliation key. `None` when the vendor cell
    /// was empty or absent.
    #[serde(default)]
    pub barcode: Option<String>,
    pub sale_price: Decimal,
    pub purchase_price: Decimal,
    pub stock: i64,
    /// Parsed from the vendor's `"Yes"`/`"No"` token.
    pub is_active: bool,
}

impl InventoryItem {
    /// Returns the barcode when one is present and non-empty.
    #[must_use]
    pub fn barcode(&self) -> Option<&str> {
        self.barcode.as_deref().filter(|b| !b.is_empty())
    }
}

/// Barcode to stock quantity, the merchant's local view of what is on hand.
///
/// Insertion overwrites, so when the map is built from several sources the
/// last source to mention a barcode decides its stock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalStockMap {
    stock: HashMap<String, i64>,
}

impl LocalStockMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `stock` for `barcode`, replacing any previous value.
    #[must_use]
    pub fn with(mut self, barcode: impl Into<String>, stock: i64) -> Self {
        self.stock.insert(barcode.into(), stock);
        self
    }

    #[must_use]
    pub fn get(&self, barcode: &str) -> Option<i64> {
        self.stock.get(barcode).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stock.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stock.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.stock.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Subtracts `quantity` from the entry for `barcode`.
    ///
    /// Returns `false` when the barcode has no entry. The result may go
    /// negative; callers check the committed state once all lines are applied.
    pub fn subtract(&mut self, barcode: &str, quantity: i64) -> bool {
        match self.stock.get_mut(barcode) {
            Some(stock) => {
                *stock = stock.saturating_sub(quantity);
                true
            }
            None => false,
        }
    }
}

impl FromIterator<(String, i64)> for LocalStockMap {
    fn from_iter<T: IntoIterator<Item = (String, i64)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |map, (barcode, stock)| map.with(barcode, stock))
    }
}

/// One confirmed order line to take out of stock before upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub barcode: String,
    pub quantity: i64,
}

/// The local state handed to a sync cycle: items whose stock the merchant
/// changed locally, and order lines sold since the last upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalUpdates {
    #[serde(default)]
    pub items: Vec<InventoryItem>,
    #[serde(default)]
    pub sales: Vec<SaleLine>,
}
