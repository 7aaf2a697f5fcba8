//! Cart and checkout commands.

use gaming_store_core::{ProductId, ProductType};
use gaming_store_storefront::Storefront;
use gaming_store_storefront::error::AppError;
use gaming_store_storefront::storage::KeyValueStore;

use crate::render;

/// Add one unit of a listed product.
#[allow(clippy::print_stdout)]
pub async fn add<S: KeyValueStore>(
    store: &Storefront<S>,
    kind: ProductType,
    id: &ProductId,
) -> Result<(), AppError> {
    let state = store.add_to_cart(kind, id).await?;
    if let Some(item) = state
        .items()
        .iter()
        .find(|item| item.kind == kind && &item.id == id)
    {
        println!("Added {} to cart", item.name);
    }
    println!("{}", render::badge(&state.summary()));
    Ok(())
}

/// Print the cart.
#[allow(clippy::print_stdout)]
pub fn show<S: KeyValueStore>(store: &Storefront<S>) {
    print!("{}", render::cart(&store.cart().state()));
}

/// Empty the cart.
#[allow(clippy::print_stdout)]
pub fn clear<S: KeyValueStore>(store: &Storefront<S>) {
    let state = store.cart().clear();
    println!("{}", render::badge(&state.summary()));
}

/// Place an order for the cart as the signed-in user.
#[allow(clippy::print_stdout)]
pub async fn checkout<S: KeyValueStore>(store: &Storefront<S>) -> Result<(), AppError> {
    let confirmation = store.checkout().await?;
    print!("{}", render::confirmation(&confirmation));
    Ok(())
}
