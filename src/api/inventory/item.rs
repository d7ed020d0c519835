//! Inventory items and the inputs that create and change them.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A new item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct NewItem {
    /// The item's barcode. Surrounding whitespace is dropped.
    #[schema(example = "12345")]
    #[validate(length(min = 1, max = 50))]
    pub barcode: String,
    /// The item's name.
    #[schema(example = "Sample Item 1")]
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Units in stock.
    #[schema(example = 10)]
    #[validate(range(min = 0))]
    pub quantity: i32,
    /// The item's description.
    #[schema(example = "A sample item")]
    #[validate(length(max = 255))]
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price.
    #[schema(example = 9.99)]
    #[validate(range(min = 0.0))]
    pub price: f64,
}

impl NewItem {
    /// Trims the barcode.
    pub fn trimmed(mut self) -> Self {
        self.barcode = self.barcode.trim().to_string();
        self
    }
}

/// An existing item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Item {
    /// The item's id.
    #[schema(example = 1)]
    pub id: i32,
    /// The item's barcode.
    #[schema(example = "12345")]
    pub barcode: String,
    /// The item's name.
    #[schema(example = "Sample Item 1")]
    pub name: String,
    /// Units in stock. Never negative.
    #[schema(example = 10)]
    pub quantity: i32,
    /// The item's description.
    #[schema(example = "A sample item")]
    pub description: Option<String>,
    /// Unit price.
    #[schema(example = 9.99)]
    pub price: f64,
}

impl Item {
    /// Creates an item from a new item and its assigned id.
    pub fn new(id: i32, new_item: NewItem) -> Self {
        Self {
            id,
            barcode: new_item.barcode,
            name: new_item.name,
            quantity: new_item.quantity,
            description: new_item.description,
            price: new_item.price,
        }
    }

    /// Overwrites the fields present in `patch`.
    pub fn apply(&mut self, patch: ItemPatch) {
        let ItemPatch {
            barcode,
            name,
            quantity,
            description,
            price,
        } = patch;
        if let Some(barcode) = barcode {
            self.barcode = barcode;
        }
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(quantity) = quantity {
            self.quantity = quantity;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(price) = price {
            self.price = price;
        }
    }

    /// Takes `quantity` units out of stock, stopping at zero.
    pub fn take(&mut self, quantity: i32) {
        self.quantity = remaining_stock(self.quantity, quantity);
    }
}

/// The stock left after taking `requested` units out of `stock`.
///
/// Overdraw is not an error, the result is clamped to zero.
pub fn remaining_stock(stock: i32, requested: i32) -> i32 {
    stock.saturating_sub(requested).max(0)
}

/// A partial update of an item. Absent fields keep their values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct ItemPatch {
    /// A new barcode. Surrounding whitespace is dropped.
    #[schema(example = "12345")]
    #[validate(length(min = 1, max = 50))]
    pub barcode: Option<String>,
    /// A new name.
    #[schema(example = "Sample Item 1")]
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// A new stock level.
    #[schema(example = 10)]
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    /// A new description. `null` clears it.
    #[schema(value_type = Option<String>, example = "A sample item")]
    #[validate(length(max = 255))]
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    /// A new unit price.
    #[schema(example = 9.99)]
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
}

/// Tells an explicit `null` apart from an absent field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::deserialize(deserializer).map(Some)
}

impl ItemPatch {
    /// Trims the barcode, if any.
    pub fn trimmed(mut self) -> Self {
        self.barcode = self.barcode.map(|barcode| barcode.trim().to_string());
        self
    }
}

impl From<NewItem> for ItemPatch {
    fn from(item: NewItem) -> Self {
        Self {
            barcode: Some(item.barcode),
            name: Some(item.name),
            quantity: Some(item.quantity),
            description: Some(item.description),
            price: Some(item.price),
        }
    }
}

/// One scanned line of a checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
pub struct CheckoutLine {
    /// The barcode of the purchased item.
    #[schema(example = "12345")]
    pub barcode: String,
    /// How many units were purchased.
    #[schema(example = 2)]
    #[validate(range(min = 0))]
    pub quantity: i32,
}

/// A batch of purchased items.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// The purchased items, in scan order.
    #[serde(default)]
    #[validate(nested)]
    pub checkout_items: Vec<CheckoutLine>,
}
