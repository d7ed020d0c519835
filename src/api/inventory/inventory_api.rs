//! The inventory API implementation.

use crate::{
    api::inventory::{
        inventory_service,
        item::{CheckoutRequest, Item, ItemPatch, NewItem},
        item_store::SharedStore,
    },
    infra::{
        error::{ApiResult, ClientError},
        extract::Json,
        state::AppState,
    },
};
use axum::{extract::State, Router};
use axum_extra::routing::{RouterExt, TypedPath};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

/// The inventory API endpoints.
pub fn routes() -> Router<AppState> {
    Router::new()
        .typed_get(list_items)
        .typed_post(create_item)
        .typed_get(get_item)
        .typed_put(update_item)
        .typed_delete(delete_item)
        .typed_post(checkout)
}

#[derive(Debug, Deserialize, TypedPath)]
#[typed_path("/inventory", rejection(ClientError))]
struct Inventory;

#[derive(Debug, Deserialize, TypedPath)]
#[typed_path("/inventory/:barcode", rejection(ClientError))]
struct InventoryBarcode {
    barcode: String,
}

#[derive(Debug, Deserialize, TypedPath)]
#[typed_path("/checkout", rejection(ClientError))]
struct Checkout;

/// Confirms that an operation went through.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Acknowledgement {
    /// Always true.
    success: bool,
    /// What happened.
    #[schema(example = "Item deleted successfully")]
    message: String,
}

impl Acknowledgement {
    pub(crate) fn new(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }

    /// What happened.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Lists all items.
#[utoipa::path(
    get,
    path = "/api/inventory",
    responses(
        (status = 200, description = "Success", body = [Item]),
        (status = 503, description = "Service Unavailable", body = ErrorBody),
    )
)]
#[instrument(skip_all)]
async fn list_items(
    Inventory: Inventory,
    State(store): State<SharedStore>,
) -> ApiResult<Json<Vec<Item>>> {
    let items = inventory_service::list_items(store.as_ref()).await?;
    Ok(Json(items))
}

/// Gets an item by its barcode.
#[utoipa::path(
    get,
    path = "/api/inventory/{barcode}",
    params(("barcode" = String, Path, description = "The item's barcode")),
    responses(
        (status = 200, description = "Ok", body = Item),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 503, description = "Service Unavailable", body = ErrorBody),
    )
)]
#[instrument(skip(store))]
async fn get_item(
    path: InventoryBarcode,
    State(store): State<SharedStore>,
) -> ApiResult<Json<Item>> {
    let item = inventory_service::read_item(store.as_ref(), &path.barcode).await?;
    Ok(Json(item))
}

/// Adds a new item.
#[utoipa::path(
    post,
    path = "/api/inventory",
    request_body = NewItem,
    responses(
        (status = 201, description = "Created", body = Item),
        (status = 409, description = "Conflict", body = ErrorBody),
        (status = 422, description = "Unprocessable Entity", body = ErrorBody),
        (status = 503, description = "Service Unavailable", body = ErrorBody),
    )
)]
#[instrument(skip(store))]
async fn create_item(
    Inventory: Inventory,
    State(store): State<SharedStore>,
    Json(new_item): Json<NewItem>,
) -> ApiResult<(StatusCode, Json<Item>)> {
    let item = inventory_service::create_item(store.as_ref(), new_item).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Updates the given fields of an item.
#[utoipa::path(
    put,
    path = "/api/inventory/{barcode}",
    params(("barcode" = String, Path, description = "The item's current barcode")),
    request_body = ItemPatch,
    responses(
        (status = 200, description = "Ok", body = Item),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 409, description = "Conflict", body = ErrorBody),
        (status = 422, description = "Unprocessable Entity", body = ErrorBody),
        (status = 503, description = "Service Unavailable", body = ErrorBody),
    )
)]
#[instrument(skip(store))]
async fn update_item(
    path: InventoryBarcode,
    State(store): State<SharedStore>,
    Json(patch): Json<ItemPatch>,
) -> ApiResult<Json<Item>> {
    let item = inventory_service::update_item(store.as_ref(), &path.barcode, patch).await?;
    Ok(Json(item))
}

/// Deletes an item.
#[utoipa::path(
    delete,
    path = "/api/inventory/{barcode}",
    params(("barcode" = String, Path, description = "The item's barcode")),
    responses(
        (status = 200, description = "Ok", body = Acknowledgement),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 503, description = "Service Unavailable", body = ErrorBody),
    )
)]
#[instrument(skip(store))]
async fn delete_item(
    path: InventoryBarcode,
    State(store): State<SharedStore>,
) -> ApiResult<Json<Acknowledgement>> {
    inventory_service::delete_item(store.as_ref(), &path.barcode).await?;
    Ok(Json(Acknowledgement::new("Item deleted successfully")))
}

/// Takes a batch of purchased items out of stock.
///
/// Unknown barcodes are ignored and stock never drops below zero.
#[utoipa::path(
    post,
    path = "/api/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Ok", body = Acknowledgement),
        (status = 422, description = "Unprocessable Entity", body = ErrorBody),
        (status = 503, description = "Service Unavailable", body = ErrorBody),
    )
)]
#[instrument(skip_all)]
async fn checkout(
    Checkout: Checkout,
    State(store): State<SharedStore>,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<Json<Acknowledgement>> {
    complete_checkout(&store, request).await
}

/// Runs a checkout and acknowledges it. Shared with the checkout page.
pub(crate) async fn complete_checkout(
    store: &SharedStore,
    request: CheckoutRequest,
) -> ApiResult<Json<Acknowledgement>> {
    inventory_service::checkout(store.as_ref(), request).await?;
    Ok(Json(Acknowledgement::new("Checkout completed successfully.")))
}
