//! The JSON API, served under `/api`.

use crate::infra::state::AppState;
use axum::Router;

pub mod info;
pub mod inventory;

/// All API routes.
pub fn api(state: AppState) -> Router {
    Router::new()
        .merge(info::info_api::routes())
        .merge(inventory::inventory_api::routes())
        .with_state(state)
}
