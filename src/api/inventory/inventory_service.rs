//! A service for interacting with inventory items.
//!
//! Normalizes and validates input before it reaches the [`ItemStore`].

use super::{
    item::{CheckoutRequest, Item, ItemPatch, NewItem},
    item_store::{ItemStore, StoreResult},
};
use crate::infra::validation::Valid;
use tracing::instrument;

/// Items put into an empty store on first start.
pub fn sample_items() -> Vec<NewItem> {
    vec![
        NewItem {
            barcode: "12345".to_string(),
            name: "Sample Item 1".to_string(),
            quantity: 10,
            description: Some("A sample item".to_string()),
            price: 9.99,
        },
        NewItem {
            barcode: "67890".to_string(),
            name: "Sample Item 2".to_string(),
            quantity: 5,
            description: Some("Another sample item".to_string()),
            price: 14.99,
        },
    ]
}

/// Prepares the store before any request is served.
///
/// Safe to call more than once: samples only go into an empty store.
#[instrument(skip(store))]
pub async fn initialize<S: ItemStore + ?Sized>(store: &S, seed_sample_data: bool) -> StoreResult<()> {
    store.init().await?;
    if seed_sample_data && store.list().await?.is_empty() {
        tracing::info!("Seeding sample items");
        for item in sample_items() {
            store.insert(Valid::new(item)?).await?;
        }
    }
    Ok(())
}

/// Lists all items.
#[instrument(skip(store))]
pub async fn list_items<S: ItemStore + ?Sized>(store: &S) -> StoreResult<Vec<Item>> {
    store.list().await
}

/// Reads an item.
#[instrument(skip(store))]
pub async fn read_item<S: ItemStore + ?Sized>(store: &S, barcode: &str) -> StoreResult<Item> {
    store.get(barcode).await
}

/// Adds a new item.
#[instrument(skip(store))]
pub async fn create_item<S: ItemStore + ?Sized>(store: &S, new_item: NewItem) -> StoreResult<Item> {
    let new_item = Valid::new(new_item.trimmed())?;
    let item = store.insert(new_item).await?;
    tracing::info!("Created item {:?}", item);
    Ok(item)
}

/// Updates the given fields of an item.
#[instrument(skip(store))]
pub async fn update_item<S: ItemStore + ?Sized>(
    store: &S,
    barcode: &str,
    patch: ItemPatch,
) -> StoreResult<Item> {
    let patch = Valid::new(patch.trimmed())?;
    let item = store.update(barcode, patch).await?;
    tracing::info!("Updated item {:?}", item);
    Ok(item)
}

/// Deletes an item.
#[instrument(skip(store))]
pub async fn delete_item<S: ItemStore + ?Sized>(store: &S, barcode: &str) -> StoreResult<()> {
    if let Err(e) = store.delete(barcode).await {
        tracing::warn!("Could not delete item: {}", e);
        return Err(e);
    }
    tracing::info!("Deleted item");
    Ok(())
}

/// Takes a batch of purchased items out of stock.
///
/// Unknown barcodes are skipped and overdrawn stock ends at zero,
/// neither is reported to the caller.
#[instrument(skip(store))]
pub async fn checkout<S: ItemStore + ?Sized>(store: &S, request: CheckoutRequest) -> StoreResult<()> {
    let request = Valid::new(request)?.into_inner();
    let lines = request.checkout_items.len();
    store.checkout(request.checkout_items).await?;
    tracing::info!("Checked out {} line(s)", lines);
    Ok(())
}
