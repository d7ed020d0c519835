//! The storage seam for inventory items.

use super::item::{CheckoutLine, Item, ItemPatch, NewItem};
use crate::infra::validation::Valid;
use async_trait::async_trait;
use std::sync::Arc;
use validator::ValidationErrors;

/// Everything that can go wrong in an [`ItemStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The input did not pass validation.
    #[error("invalid input: {0}")]
    Invalid(#[from] ValidationErrors),
    /// No item has the barcode.
    #[error("no item with barcode {0:?}")]
    NotFound(String),
    /// Another item already has the barcode.
    #[error("an item with barcode {0:?} already exists")]
    Conflict(String),
    /// The underlying database failed.
    #[error("store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
    /// The schema could not be brought up to date.
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// The result of calling store functions.
pub type StoreResult<T> = Result<T, StoreError>;

/// Owns all items and the operations over them.
///
/// Writes take [`Valid`] values, so unchecked input never reaches persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Prepares the store for use. Calling it more than once is harmless.
    async fn init(&self) -> StoreResult<()>;

    /// Lists all items in insertion order.
    async fn list(&self) -> StoreResult<Vec<Item>>;

    /// Finds the item with exactly this barcode.
    async fn get(&self, barcode: &str) -> StoreResult<Item>;

    /// Stores a new item and returns it with its assigned id.
    async fn insert(&self, new_item: Valid<NewItem>) -> StoreResult<Item>;

    /// Changes the fields present in `patch` on the item with this barcode.
    async fn update(&self, barcode: &str, patch: Valid<ItemPatch>) -> StoreResult<Item>;

    /// Removes the item with this barcode.
    async fn delete(&self, barcode: &str) -> StoreResult<()>;

    /// Takes the purchased quantities out of stock, all or nothing.
    ///
    /// Lines with an unknown barcode are skipped without error,
    /// and stock that would go negative is clamped to zero.
    async fn checkout(&self, lines: Vec<CheckoutLine>) -> StoreResult<()>;
}

/// A store shared between request handlers.
pub type SharedStore = Arc<dyn ItemStore>;
