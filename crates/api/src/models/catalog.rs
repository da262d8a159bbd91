//! Catalog reference data: products and stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bestcart_core::{ProductId, StoreId};

/// A canonical product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    /// Department used to group list items (e.g. "Dairy").
    pub canonical_department: Option<String>,
    /// Unit shown when a list item has none of its own (e.g. "gallon").
    pub default_units: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The slice of a product needed to build a search result.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub manufacturer: Option<String>,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            manufacturer: product.manufacturer.clone(),
        }
    }
}

/// A store that carries products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub base_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for adding a product to the catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub canonical_department: Option<String>,
    pub default_units: Option<String>,
}

/// Request body for adding a store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewStore {
    pub name: String,
    pub base_url: Option<String>,
}
