//! Server-rendered pages.

use crate::infra::state::AppState;
use axum::Router;
use tower_http::services::ServeDir;

pub mod checkout_page;
pub mod inventory_page;
pub mod item_form;

/// Where static assets are served from, relative to the working directory.
const STATIC_DIR: &str = "static";

/// View routes.
pub fn views(state: AppState) -> Router {
    Router::new()
        .merge(checkout_page::routes())
        .merge(inventory_page::routes())
        .merge(item_form::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .with_state(state)
}
