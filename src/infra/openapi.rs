//! OpenAPI configuration.

use crate::api::{
    info::info_api,
    inventory::{inventory_api, item},
};
use utoipa::OpenApi;

/// OpenApi configuration.
#[derive(OpenApi)]
#[openapi(
    info(title = "Stockroom", description = "Inventory and checkout API"),
    paths(
        info_api::info,
        inventory_api::list_items,
        inventory_api::get_item,
        inventory_api::create_item,
        inventory_api::update_item,
        inventory_api::delete_item,
        inventory_api::checkout,
    ),
    components(
        schemas(
            info_api::AppInfo,
            item::Item,
            item::NewItem,
            item::ItemPatch,
            item::CheckoutLine,
            item::CheckoutRequest,
            inventory_api::Acknowledgement,
            crate::infra::error::ErrorBody
        )
    ),
    tags((name = "stockroom", description = "Inventory management"))
)]
#[derive(Clone, Copy, Debug)]
pub struct ApiDoc;
