//! Forms for adding and editing items.
//!
//! Failed submissions re-render the form with the submitted values and a
//! description of what went wrong.

use super::inventory_page::InventoryPath;
use crate::{
    api::inventory::{
        inventory_service,
        item::{Item, ItemPatch, NewItem},
        item_store::{SharedStore, StoreError},
    },
    infra::{
        error::{ApiResult, ClientError},
        state::AppState,
        validation::invalid_fields,
    },
};
use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form, Router,
};
use axum_extra::routing::{RouterExt, TypedPath};
use http::StatusCode;
use serde::Deserialize;
use tracing::instrument;
use validator::{ValidationError, ValidationErrors};

pub fn routes() -> Router<AppState> {
    Router::new()
        .typed_get(get_add)
        .typed_post(post_add)
        .typed_get(get_edit)
        .typed_post(post_edit)
}

#[derive(TypedPath)]
#[typed_path("/add", rejection(ClientError))]
pub struct AddPath;

#[derive(Debug, Deserialize, TypedPath)]
#[typed_path("/edit/:barcode", rejection(ClientError))]
pub struct EditPath {
    pub barcode: String,
}

/// The fields of the item form, exactly as submitted.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ItemForm {
    pub barcode: String,
    pub name: String,
    pub quantity: String,
    pub description: String,
    pub price: String,
}

impl ItemForm {
    /// Parses the numeric fields. Range and length checks happen later.
    pub fn parse(&self) -> Result<NewItem, StoreError> {
        let mut errors = ValidationErrors::new();
        let quantity = self.quantity.trim().parse::<i32>().ok();
        if quantity.is_none() {
            errors.add("quantity", ValidationError::new("integer"));
        }
        let price = self
            .price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite());
        if price.is_none() {
            errors.add("price", ValidationError::new("number"));
        }
        match (quantity, price) {
            (Some(quantity), Some(price)) => Ok(NewItem {
                barcode: self.barcode.clone(),
                name: self.name.clone(),
                quantity,
                description: Some(self.description.clone()),
                price,
            }),
            _ => Err(StoreError::Invalid(errors)),
        }
    }
}

impl From<Item> for ItemForm {
    fn from(item: Item) -> Self {
        Self {
            barcode: item.barcode,
            name: item.name,
            quantity: item.quantity.to_string(),
            description: item.description.unwrap_or_default(),
            price: item.price.to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "item_form.html")]
pub struct ItemFormTemplate {
    title: &'static str,
    action: String,
    form: ItemForm,
    error: Option<String>,
    existing_barcodes: Vec<String>,
}

/// Describes an error the user can fix, or hands back the ones they cannot.
fn user_error(e: StoreError) -> ApiResult<String> {
    match e {
        StoreError::Invalid(errors) => Ok(format!(
            "Error: invalid field(s): {}",
            invalid_fields(&errors).join(", ")
        )),
        e @ (StoreError::Conflict(_) | StoreError::NotFound(_)) => Ok(format!("Error: {e}")),
        e => Err(e.into()),
    }
}

fn item_not_found() -> Response {
    (StatusCode::NOT_FOUND, "Item not found.").into_response()
}

async fn add_template(
    store: &SharedStore,
    form: ItemForm,
    error: Option<String>,
) -> ApiResult<ItemFormTemplate> {
    let existing_barcodes = inventory_service::list_items(store.as_ref())
        .await?
        .into_iter()
        .map(|item| item.barcode)
        .collect();
    Ok(ItemFormTemplate {
        title: "Add Item",
        action: AddPath.to_string(),
        form,
        error,
        existing_barcodes,
    })
}

fn edit_template(barcode: String, form: ItemForm, error: Option<String>) -> ItemFormTemplate {
    ItemFormTemplate {
        title: "Edit Item",
        action: EditPath { barcode }.to_string(),
        form,
        error,
        existing_barcodes: Vec::new(),
    }
}

/// Display the add form.
#[instrument(skip_all)]
async fn get_add(_: AddPath, State(store): State<SharedStore>) -> ApiResult<ItemFormTemplate> {
    add_template(&store, ItemForm::default(), None).await
}

/// Add an item and go to the inventory.
#[instrument(skip(store))]
async fn post_add(
    _: AddPath,
    State(store): State<SharedStore>,
    Form(form): Form<ItemForm>,
) -> ApiResult<Response> {
    let result = match form.parse() {
        Ok(new_item) => inventory_service::create_item(store.as_ref(), new_item).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(_) => Ok(Redirect::to(&InventoryPath.to_string()).into_response()),
        Err(e) => {
            let error = user_error(e)?;
            Ok(add_template(&store, form, Some(error))
                .await?
                .into_response())
        }
    }
}

/// Display the edit form for an item.
#[instrument(skip(store))]
async fn get_edit(path: EditPath, State(store): State<SharedStore>) -> ApiResult<Response> {
    match inventory_service::read_item(store.as_ref(), &path.barcode).await {
        Ok(item) => Ok(edit_template(path.barcode, ItemForm::from(item), None).into_response()),
        Err(StoreError::NotFound(_)) => Ok(item_not_found()),
        Err(e) => Err(e.into()),
    }
}

/// Overwrite every field of an item and go to the inventory.
#[instrument(skip(store))]
async fn post_edit(
    path: EditPath,
    State(store): State<SharedStore>,
    Form(form): Form<ItemForm>,
) -> ApiResult<Response> {
    let result = match form.parse() {
        Ok(new_item) => {
            let patch = ItemPatch::from(new_item);
            inventory_service::update_item(store.as_ref(), &path.barcode, patch).await
        }
        Err(e) => Err(e),
    };
    match result {
        Ok(_) => Ok(Redirect::to(&InventoryPath.to_string()).into_response()),
        Err(StoreError::NotFound(_)) => Ok(item_not_found()),
        Err(e) => {
            let error = user_error(e)?;
            Ok(edit_template(path.barcode, form, Some(error)).into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(quantity: &str, price: &str) -> ItemForm {
        ItemForm {
            barcode: "A1".to_string(),
            name: "Widget".to_string(),
            quantity: quantity.to_string(),
            description: String::new(),
            price: price.to_string(),
        }
    }

    #[test]
    fn numbers_are_parsed() {
        let item = form(" 4 ", "2.5").parse().unwrap();
        assert_eq!(4, item.quantity);
        assert_eq!(2.5, item.price);
        assert_eq!(Some(String::new()), item.description);
    }

    #[test]
    fn unparsable_numbers_name_their_fields() {
        let Err(StoreError::Invalid(errors)) = form("four", "NaN").parse() else {
            panic!("expected a validation error");
        };
        assert_eq!(
            vec!["price (number)", "quantity (integer)"],
            invalid_fields(&errors)
        );
    }

    #[test]
    fn store_failures_are_not_shown_in_the_form() {
        assert!(user_error(StoreError::Unavailable(sqlx::Error::PoolTimedOut)).is_err());
        assert_eq!(
            "Error: an item with barcode \"A1\" already exists",
            user_error(StoreError::Conflict("A1".to_string())).unwrap()
        );
    }
}
