//! Product catalog.
//!
//! Loads the two catalog sections (games, accessories) from the store
//! backend and answers lookups against the loaded lists.

use thiserror::Error;
use tracing::{debug, instrument, warn};

use gaming_store_core::{ProductId, ProductType};

use crate::api::{
    AccessoriesResponse, ApiClient, ApiError, GameFilter, GamesResponse, ProductSource,
};
use crate::models::Product;

/// Backend that lists products.
pub trait CatalogService: Send + Sync {
    /// Games matching `filter`.
    fn games(
        &self,
        filter: &GameFilter,
    ) -> impl Future<Output = Result<GamesResponse, ApiError>> + Send;

    /// All accessories.
    fn accessories(&self) -> impl Future<Output = Result<AccessoriesResponse, ApiError>> + Send;
}

impl CatalogService for ApiClient {
    async fn games(&self, filter: &GameFilter) -> Result<GamesResponse, ApiError> {
        Self::games(self, filter).await
    }

    async fn accessories(&self) -> Result<AccessoriesResponse, ApiError> {
        Self::accessories(self).await
    }
}

/// Errors that can occur when loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The product service could not be reached or answered garbage.
    #[error("product service unavailable: {0}")]
    Transport(#[from] ApiError),
}

/// Both catalog sections as last loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub games: Vec<Product>,
    pub accessories: Vec<Product>,
}

impl Catalog {
    /// Fetch games, then accessories.
    ///
    /// A section whose endpoint answers `success: false` is left empty.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Transport` if either request fails.
    #[instrument(skip(service))]
    pub async fn load<C: CatalogService>(
        service: &C,
        filter: &GameFilter,
    ) -> Result<Self, CatalogError> {
        let games = service.games(filter).await?;
        let games = if games.success {
            into_products(games.games, ProductType::Game)
        } else {
            warn!(message = ?games.message, "Games endpoint reported failure");
            Vec::new()
        };

        let accessories = service.accessories().await?;
        let accessories = if accessories.success {
            into_products(accessories.accessories, ProductType::Accessory)
        } else {
            warn!(message = ?accessories.message, "Accessories endpoint reported failure");
            Vec::new()
        };

        debug!(
            games = games.len(),
            accessories = accessories.len(),
            "Catalog loaded"
        );
        Ok(Self { games, accessories })
    }

    /// Every product, games first.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.games.iter().chain(&self.accessories)
    }

    /// Whether neither section has products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty() && self.accessories.is_empty()
    }

    /// Products whose name or description contains `query`, ignoring case.
    /// A blank query matches everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let needle = query.trim().to_lowercase();
        self.products()
            .filter(|product| needle.is_empty() || product.matches(&needle))
            .collect()
    }

    /// Look up a product by section and id.
    #[must_use]
    pub fn find(&self, kind: ProductType, id: &ProductId) -> Option<&Product> {
        let section = match kind {
            ProductType::Game => &self.games,
            ProductType::Accessory => &self.accessories,
        };
        section.iter().find(|product| &product.id == id)
    }
}

fn into_products(sources: Vec<ProductSource>, kind: ProductType) -> Vec<Product> {
    sources
        .into_iter()
        .map(|source| Product::from_source(source, kind))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct FakeCatalog {
        games: GamesResponse,
        accessories: Result<AccessoriesResponse, u16>,
        last_filter: Mutex<Option<GameFilter>>,
    }

    impl CatalogService for FakeCatalog {
        async fn games(&self, filter: &GameFilter) -> Result<GamesResponse, ApiError> {
            *self.last_filter.lock().unwrap() = Some(filter.clone());
            Ok(self.games.clone())
        }

        async fn accessories(&self) -> Result<AccessoriesResponse, ApiError> {
            self.accessories.clone().map_err(|status| ApiError::Status {
                status,
                body: String::new(),
            })
        }
    }

    fn games() -> GamesResponse {
        serde_json::from_value(serde_json::json!({
            "success": true,
            "games": [
                {"id": 1, "name": "FIFA 2024", "price": 299, "category": "sports",
                 "platform": ["PS5", "Xbox"], "description": "Football simulation"},
                {"id": 4, "name": "Elden Ring", "price": 349, "category": "rpg",
                 "platform": ["PS5", "PC"], "description": "Open world action RPG"}
            ]
        }))
        .unwrap()
    }

    fn accessories() -> AccessoriesResponse {
        serde_json::from_value(serde_json::json!({
            "success": true,
            "accessories": [
                {"id": 1, "name": "DualSense Controller", "price": 250, "brand": "Sony"},
                {"id": 2, "name": "Gaming Headset", "price": 180, "in_stock": false}
            ]
        }))
        .unwrap()
    }

    fn fake() -> FakeCatalog {
        FakeCatalog {
            games: games(),
            accessories: Ok(accessories()),
            last_filter: Mutex::new(None),
        }
    }

    #[tokio::test]
    async fn test_load_tags_sections() {
        let catalog = Catalog::load(&fake(), &GameFilter::default()).await.unwrap();

        assert_eq!(catalog.games.len(), 2);
        assert_eq!(catalog.accessories.len(), 2);
        assert!(catalog.games.iter().all(|p| p.kind == ProductType::Game));
        assert!(
            catalog
                .accessories
                .iter()
                .all(|p| p.kind == ProductType::Accessory)
        );
    }

    #[tokio::test]
    async fn test_load_passes_filter() {
        let service = fake();
        let filter = GameFilter {
            category: Some("rpg".to_string()),
            platform: Some("PS5".to_string()),
        };
        Catalog::load(&service, &filter).await.unwrap();
        assert_eq!(service.last_filter.lock().unwrap().clone(), Some(filter));
    }

    #[tokio::test]
    async fn test_unsuccessful_section_is_empty() {
        let mut service = fake();
        service.games = GamesResponse {
            success: false,
            games: Vec::new(),
            message: Some("Failed to fetch games".to_string()),
        };

        let catalog = Catalog::load(&service, &GameFilter::default()).await.unwrap();
        assert!(catalog.games.is_empty());
        assert_eq!(catalog.accessories.len(), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_is_surfaced() {
        let mut service = fake();
        service.accessories = Err(500);

        let err = Catalog::load(&service, &GameFilter::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Transport(ApiError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_find_distinguishes_sections() {
        let catalog = Catalog::load(&fake(), &GameFilter::default()).await.unwrap();
        let id = ProductId::new("1");

        let game = catalog.find(ProductType::Game, &id).unwrap();
        let pad = catalog.find(ProductType::Accessory, &id).unwrap();
        assert_eq!(game.name, "FIFA 2024");
        assert_eq!(pad.name, "DualSense Controller");
        assert!(catalog.find(ProductType::Accessory, &ProductId::new("4")).is_none());
    }

    #[tokio::test]
    async fn test_search() {
        let catalog = Catalog::load(&fake(), &GameFilter::default()).await.unwrap();

        let names: Vec<_> = catalog.search("RPG").iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Elden Ring"]);

        let names: Vec<_> = catalog.search("ga").iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Gaming Headset"]);

        assert_eq!(catalog.search("  ").len(), 4);
        assert!(catalog.search("zelda").is_empty());
    }
}
