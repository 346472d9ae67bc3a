use serde::{Deserialize, Serialize};

use labledger_core::{DomainError, DomainResult, ProductName};

/// One inventory row: available stock of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(rename = "Product")]
    name: ProductName,
    #[serde(rename = "Quantity")]
    quantity: u32,
}

impl InventoryItem {
    pub fn new(name: ProductName, quantity: u32) -> Self {
        Self { name, quantity }
    }

    pub fn name(&self) -> &ProductName {
        &self.name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Stock seeded when no inventory relation exists yet.
const DEFAULT_LAB_STOCK: &[(&str, u32)] = &[
    ("Microscope", 10),
    ("Beaker", 50),
    ("Test Tube", 100),
    ("Pipette", 40),
    ("Slide", 200),
];

/// Inventory relation: product name is the unique key, row order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    items: Vec<InventoryItem>,
}

impl Inventory {
    /// Build from loaded rows, rejecting duplicate product names.
    pub fn new(items: Vec<InventoryItem>) -> DomainResult<Self> {
        for (idx, item) in items.iter().enumerate() {
            if items[..idx].iter().any(|other| other.name == item.name) {
                return Err(DomainError::invariant(format!(
                    "duplicate inventory row for {}",
                    item.name
                )));
            }
        }
        Ok(Self { items })
    }

    pub fn default_lab_stock() -> Self {
        let items = DEFAULT_LAB_STOCK
            .iter()
            .filter_map(|(name, qty)| ProductName::new(name).ok().map(|n| InventoryItem::new(n, *qty)))
            .collect();
        Self { items }
    }

    pub fn get(&self, product: &ProductName) -> Option<&InventoryItem> {
        self.items.iter().find(|i| &i.name == product)
    }

    pub fn quantity_of(&self, product: &ProductName) -> Option<u32> {
        self.get(product).map(InventoryItem::quantity)
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn products(&self) -> impl Iterator<Item = &ProductName> {
        self.items.iter().map(|i| &i.name)
    }

    pub fn into_items(self) -> Vec<InventoryItem> {
        self.items
    }

    pub(crate) fn get_mut(&mut self, product: &ProductName) -> Option<&mut InventoryItem> {
        self.items.iter_mut().find(|i| &i.name == product)
    }
}

impl InventoryItem {
    // Only called from `Ledger::apply`, after `handle` has checked the bounds.
    pub(crate) fn withdraw_one(&mut self) {
        self.quantity = self.quantity.saturating_sub(1);
    }

    pub(crate) fn restock_one(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str) -> ProductName {
        ProductName::new(name).unwrap()
    }

    #[test]
    fn default_stock_matches_lab_catalogue() {
        let inv = Inventory::default_lab_stock();
        assert_eq!(inv.items().len(), 5);
        assert_eq!(inv.quantity_of(&product("Microscope")), Some(10));
        assert_eq!(inv.quantity_of(&product("Slide")), Some(200));
        assert_eq!(inv.quantity_of(&product("Bunsen Burner")), None);
    }

    #[test]
    fn duplicate_rows_are_rejected() {
        let err = Inventory::new(vec![
            InventoryItem::new(product("Beaker"), 1),
            InventoryItem::new(product("Beaker"), 2),
        ])
        .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn withdraw_never_underflows() {
        let mut item = InventoryItem::new(product("Pipette"), 0);
        assert!(!item.in_stock());
        item.withdraw_one();
        assert_eq!(item.quantity(), 0);
        item.restock_one();
        assert_eq!(item.quantity(), 1);
    }
}
