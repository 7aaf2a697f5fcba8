//! Catalog browsing commands.

use gaming_store_storefront::Storefront;
use gaming_store_storefront::api::GameFilter;
use gaming_store_storefront::error::AppError;
use gaming_store_storefront::storage::KeyValueStore;

use crate::render;

/// List both catalog sections.
#[allow(clippy::print_stdout)]
pub async fn products<S: KeyValueStore>(
    store: &Storefront<S>,
    filter: &GameFilter,
) -> Result<(), AppError> {
    let catalog = store.catalog(filter).await?;

    let games: Vec<_> = catalog.games.iter().collect();
    let accessories: Vec<_> = catalog.accessories.iter().collect();
    print!("{}", render::section("Games", &games));
    print!("{}", render::section("Accessories", &accessories));
    Ok(())
}

/// List products matching `query`.
#[allow(clippy::print_stdout)]
pub async fn search<S: KeyValueStore>(store: &Storefront<S>, query: &str) -> Result<(), AppError> {
    if query.trim().is_empty() {
        return Err(AppError::BadRequest("Please enter something to search for".to_string()));
    }

    let catalog = store.catalog(&GameFilter::default()).await?;
    let matches = catalog.search(query);
    if matches.is_empty() {
        println!("No products match \"{}\"", query.trim());
        return Ok(());
    }
    print!("{}", render::section("Results", &matches));
    Ok(())
}
