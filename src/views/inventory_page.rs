//! The inventory table and item deletion.

use super::item_form::EditPath;
use crate::{
    api::inventory::{
        inventory_service,
        item::Item,
        item_store::{SharedStore, StoreError},
    },
    infra::{
        error::{ApiResult, ClientError},
        state::AppState,
    },
};
use askama::Template;
use axum::{extract::State, response::Redirect, Router};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use tracing::instrument;

pub fn routes() -> Router<AppState> {
    Router::new().typed_get(inventory).typed_get(delete)
}

#[derive(TypedPath)]
#[typed_path("/inventory", rejection(ClientError))]
pub struct InventoryPath;

#[derive(Debug, Deserialize, TypedPath)]
#[typed_path("/delete/:barcode", rejection(ClientError))]
pub struct DeletePath {
    pub barcode: String,
}

/// An item formatted for display.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemView {
    pub barcode: String,
    pub name: String,
    pub quantity: i32,
    pub description: String,
    pub price: String,
    pub edit_url: String,
    pub delete_url: String,
}

impl From<Item> for ItemView {
    fn from(item: Item) -> Self {
        let edit_url = EditPath {
            barcode: item.barcode.clone(),
        }
        .to_string();
        let delete_url = DeletePath {
            barcode: item.barcode.clone(),
        }
        .to_string();
        Self {
            barcode: item.barcode,
            name: item.name,
            quantity: item.quantity,
            description: item.description.unwrap_or_default(),
            price: format!("{:.2}", item.price),
            edit_url,
            delete_url,
        }
    }
}

#[derive(Template)]
#[template(path = "inventory.html")]
pub struct InventoryTemplate {
    items: Vec<ItemView>,
}

/// Display the inventory.
#[instrument(skip_all)]
async fn inventory(
    _: InventoryPath,
    State(store): State<SharedStore>,
) -> ApiResult<InventoryTemplate> {
    let items = inventory_service::list_items(store.as_ref()).await?;
    Ok(InventoryTemplate {
        items: items.into_iter().map(ItemView::from).collect(),
    })
}

/// Delete an item, if it exists, and go back to the inventory.
#[instrument(skip(store))]
async fn delete(path: DeletePath, State(store): State<SharedStore>) -> ApiResult<Redirect> {
    match inventory_service::delete_item(store.as_ref(), &path.barcode).await {
        Ok(()) | Err(StoreError::NotFound(_)) => Ok(Redirect::to(&InventoryPath.to_string())),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_view_formats_price_and_links() {
        let view = ItemView::from(Item {
            id: 1,
            barcode: "A 1".to_string(),
            name: "Widget".to_string(),
            quantity: 3,
            description: None,
            price: 2.5,
        });
        assert_eq!("2.50", view.price);
        assert_eq!("", view.description);
        assert_eq!("/edit/A%201", view.edit_url);
        assert_eq!("/delete/A%201", view.delete_url);
    }
}
