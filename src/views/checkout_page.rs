//! The checkout page, where scanned items are collected into a cart.

use super::inventory_page::ItemView;
use crate::{
    api::inventory::{
        inventory_api::{complete_checkout, Acknowledgement},
        inventory_service,
        item::CheckoutRequest,
        item_store::SharedStore,
    },
    infra::{
        error::{ApiResult, ClientError, InternalError},
        extract::Json,
        state::AppState,
    },
};
use askama::Template;
use axum::{extract::State, Router};
use axum_extra::routing::{RouterExt, TypedPath};
use tracing::instrument;

pub fn routes() -> Router<AppState> {
    Router::new()
        .typed_get(index)
        .typed_get(get_checkout)
        .typed_post(post_complete_checkout)
}

#[derive(TypedPath)]
#[typed_path("/", rejection(ClientError))]
pub struct Index;

#[derive(TypedPath)]
#[typed_path("/checkout", rejection(ClientError))]
pub struct CheckoutPath;

#[derive(TypedPath)]
#[typed_path("/complete_checkout", rejection(ClientError))]
pub struct CompleteCheckoutPath;

#[derive(Template)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    items: Vec<ItemView>,
    /// The inventory as JSON, for the cart script.
    inventory_json: String,
}

async fn render(store: &SharedStore) -> ApiResult<CheckoutTemplate> {
    let items = inventory_service::list_items(store.as_ref()).await?;
    // `<` is escaped so the JSON cannot close the surrounding script tag.
    let inventory_json = serde_json::to_string(&items)
        .map_err(|e| InternalError::Other(format!("could not serialize inventory: {e}")))?
        .replace('<', "\\u003c");
    Ok(CheckoutTemplate {
        items: items.into_iter().map(ItemView::from).collect(),
        inventory_json,
    })
}

/// Display the checkout page.
#[instrument(skip_all)]
async fn index(_: Index, State(store): State<SharedStore>) -> ApiResult<CheckoutTemplate> {
    render(&store).await
}

/// Display the checkout page.
#[instrument(skip_all)]
async fn get_checkout(
    _: CheckoutPath,
    State(store): State<SharedStore>,
) -> ApiResult<CheckoutTemplate> {
    render(&store).await
}

/// Complete the checkout submitted by the page's script.
#[instrument(skip_all)]
async fn post_complete_checkout(
    _: CompleteCheckoutPath,
    State(store): State<SharedStore>,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<Json<Acknowledgement>> {
    complete_checkout(&store, request).await
}
