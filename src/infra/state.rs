//! Global application state.
//!
//! Used for access to common resources such as the item store.

use crate::api::inventory::item_store::SharedStore;
use axum::extract::FromRef;

/// Global application state.
#[derive(Clone, FromRef)]
pub struct AppState {
    store: SharedStore,
}

impl AppState {
    /// Constructs a new [`AppState`].
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}
