//! Shopping lists and their items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bestcart_core::{ListItemId, ProductId, ShoppingListId, UserId};

/// Department shown for an item when neither the item nor its product has one.
pub const DEFAULT_DEPARTMENT: &str = "Other";

/// Units shown for an item when neither the item nor its product has any.
pub const DEFAULT_UNITS: &str = "Unit";

/// A user's shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShoppingList {
    pub id: ShoppingListId,
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    /// Templates are kept for reuse and left out of the user's list index.
    pub is_template: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product placed on a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ListItem {
    pub id: ListItemId,
    pub shopping_list_id: ShoppingListId,
    pub product_id: ProductId,
    pub department_grouping: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    pub units: Option<String>,
    pub is_checked: bool,
    pub notes: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// A list item joined with its product, as stored.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ListProductRow {
    pub item_id: ListItemId,
    pub shopping_list_id: ShoppingListId,
    pub department_grouping: Option<String>,
    pub quantity: Decimal,
    pub units: Option<String>,
    pub is_checked: bool,
    pub notes: Option<String>,
    pub added_at: DateTime<Utc>,
    pub product_id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub canonical_department: Option<String>,
    pub default_units: Option<String>,
    pub product_created_at: DateTime<Utc>,
    pub product_updated_at: DateTime<Utc>,
}

/// A list item as shown to the client, with department and units resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListProductView {
    pub id: ListItemId,
    pub product_id: ProductId,
    pub list_id: ShoppingListId,
    pub name: String,
    pub manufacturer: Option<String>,
    pub department_display: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    pub units_display: String,
    pub is_checked: bool,
    pub added_at: DateTime<Utc>,
    pub product_created_at: DateTime<Utc>,
    pub product_updated_at: DateTime<Utc>,
}

/// First value that is present and not blank.
fn first_filled(candidates: [Option<String>; 2], fallback: &str) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| fallback.to_owned())
}

impl From<ListProductRow> for ListProductView {
    fn from(row: ListProductRow) -> Self {
        Self {
            id: row.item_id,
            product_id: row.product_id,
            list_id: row.shopping_list_id,
            name: row.name,
            manufacturer: row.manufacturer,
            department_display: first_filled(
                [row.department_grouping, row.canonical_department],
                DEFAULT_DEPARTMENT,
            ),
            description: row.description,
            notes: row.notes,
            quantity: row.quantity,
            units_display: first_filled([row.units, row.default_units], DEFAULT_UNITS),
            is_checked: row.is_checked,
            added_at: row.added_at,
            product_created_at: row.product_created_at,
            product_updated_at: row.product_updated_at,
        }
    }
}

/// Request body for creating a list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewShoppingList {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_template: bool,
}

/// Request body for a partial list update. Absent fields are left alone; an
/// empty `description` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShoppingListUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_template: Option<bool>,
}

impl ShoppingListUpdate {
    /// True when the update would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.is_template.is_none()
    }
}

/// Request body for adding a product to a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListItem {
    pub product_id: ProductId,
    pub quantity: Option<Decimal>,
    pub units: Option<String>,
    pub notes: Option<String>,
    pub department_grouping: Option<String>,
}

impl NewListItem {
    /// Add `product_id` with every other field left to its default.
    #[must_use]
    pub const fn product(product_id: ProductId) -> Self {
        Self {
            product_id,
            quantity: None,
            units: None,
            notes: None,
            department_grouping: None,
        }
    }
}
