//! Cart line items.

use serde::{Deserialize, Serialize};

use crate::{Price, ProductId, ProductType};

/// One distinct product entry in the cart.
///
/// The name and unit price are captured when the product is added and are
/// never re-fetched. This is also the shape persisted in the cart snapshot
/// and sent to the order service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product id, unique only together with `kind`.
    pub id: ProductId,
    /// Display name at add-time.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Number of units, always positive.
    pub quantity: u32,
    /// Product category.
    #[serde(rename = "type")]
    pub kind: ProductType,
}

impl LineItem {
    /// Create a line item with a quantity of one.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        kind: ProductType,
        name: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity: 1,
            kind,
        }
    }

    /// Whether this line refers to the same product as `other`.
    #[must_use]
    pub fn same_product(&self, other: &Self) -> bool {
        self.kind == other.kind && self.id == other.id
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let item = LineItem::new("g1", ProductType::Game, "Game A", Price::new(150));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "g1",
                "name": "Game A",
                "price": 150,
                "quantity": 1,
                "type": "game"
            })
        );
    }

    #[test]
    fn test_same_product_requires_matching_type() {
        let game = LineItem::new("1", ProductType::Game, "FIFA 2024", Price::new(299));
        let pad = LineItem::new("1", ProductType::Accessory, "Pad", Price::new(80));
        assert!(!game.same_product(&pad));
        assert!(game.same_product(&game.clone()));
    }

    #[test]
    fn test_line_total() {
        let mut item = LineItem::new("g1", ProductType::Game, "Game A", Price::new(150));
        item.quantity = 3;
        assert_eq!(item.line_total(), Price::new(450));
    }

    #[test]
    fn test_deserialize_numeric_id() {
        let item: LineItem = serde_json::from_str(
            r#"{"id": 4, "name": "Elden Ring", "price": 349, "quantity": 2, "type": "game"}"#,
        )
        .unwrap();
        assert_eq!(item.id.as_str(), "4");
        assert_eq!(item.quantity, 2);
    }
}
