//! Catalog product (domain type).

use gaming_store_core::{LineItem, Price, ProductId, ProductType};

use crate::api::ProductSource;

/// A product from either catalog section, tagged with its category.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub kind: ProductType,
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: Option<String>,
    pub category: Option<String>,
    pub platform: Vec<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub in_stock: Option<bool>,
}

impl Product {
    /// Tag a wire product with the section it was listed under.
    #[must_use]
    pub fn from_source(source: ProductSource, kind: ProductType) -> Self {
        Self {
            kind,
            id: source.id,
            name: source.name,
            price: source.price,
            image: source.image,
            category: source.category,
            platform: source.platform,
            brand: source.brand,
            description: source.description,
            rating: source.rating,
            in_stock: source.in_stock,
        }
    }

    /// Add-to-cart candidate capturing the current name and price.
    #[must_use]
    pub fn to_line_item(&self) -> LineItem {
        LineItem::new(self.id.clone(), self.kind, self.name.clone(), self.price)
    }

    /// Case-insensitive match of `needle` (already lower-cased) against
    /// name and description.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }

    /// Whether the backend marked the product as out of stock.
    #[must_use]
    pub fn is_out_of_stock(&self) -> bool {
        self.in_stock == Some(false)
    }
}
