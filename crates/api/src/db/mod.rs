//! Database access for the BestCart API.
//!
//! # Database: `bestcart`
//!
//! ## Tables
//!
//! - `bestcart.store` - Stores that carry products
//! - `bestcart.product` - Canonical product catalog
//! - `bestcart.store_product` - Current price of a product at a store
//! - `bestcart.user` - Users and their preferred store
//! - `bestcart.shopping_list` - Lists owned by a user
//! - `bestcart.list_item` - Products placed on a list
//!
//! # Repositories
//!
//! All access goes through the [`Repository`] trait. [`PgRepository`] is the
//! production implementation; [`InMemoryRepository`] keeps its data in process
//! for tests and local development.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p bestcart-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::future::Future;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::warn;

use bestcart_core::{ProductId, ShoppingListId, StoreId, StorePrice, UserId, parse_price};

use crate::models::{
    ListItem, ListProductRow, NewListItem, NewProduct, NewShoppingList, NewStore, Product,
    ProductSummary, ShoppingList, ShoppingListUpdate, Store, User,
};

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A write collided with a unique constraint (e.g. a store name).
    #[error("duplicate {0}")]
    Duplicate(&'static str),
}

impl RepositoryError {
    /// Translate a unique-constraint violation into [`RepositoryError::Duplicate`].
    #[must_use]
    pub fn on_unique_violation(err: sqlx::Error, what: &'static str) -> Self {
        if let sqlx::Error::Database(db) = &err
            && db.is_unique_violation()
        {
            return Self::Duplicate(what);
        }
        Self::Database(err)
    }
}

/// Access to users, the product catalog, store prices and shopping lists.
///
/// Absent rows are reported as `None` (or an empty list), never as an error;
/// errors mean the backing store could not be read or a write was refused.
/// List operations take the owning user so one user can never reach another
/// user's list.
pub trait Repository: Send + Sync + 'static {
    /// Check that the backing store is reachable.
    fn ping(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Preferred store of a user. A missing user has no preferred store.
    fn preferred_store(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<StoreId>, RepositoryError>> + Send;

    /// Products whose name contains `fragment`, case-insensitively.
    ///
    /// At most `limit` products, ordered by name then ID.
    fn find_products_by_name(
        &self,
        fragment: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<ProductSummary>, RepositoryError>> + Send;

    /// Every store price recorded for a product, ordered by store ID.
    fn list_prices_for_product(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Vec<StorePrice>, RepositoryError>> + Send;

    /// All products, ordered by name.
    fn list_products(&self) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    /// A single product.
    fn get_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<Product>, RepositoryError>> + Send;

    /// All stores, ordered by name.
    fn list_stores(&self) -> impl Future<Output = Result<Vec<Store>, RepositoryError>> + Send;

    /// A single store.
    fn get_store(
        &self,
        id: StoreId,
    ) -> impl Future<Output = Result<Option<Store>, RepositoryError>> + Send;

    /// A single user.
    fn get_user(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Add a product. A taken name is [`RepositoryError::Duplicate`].
    fn create_product(
        &self,
        product: &NewProduct,
    ) -> impl Future<Output = Result<ProductId, RepositoryError>> + Send;

    /// Add a store. A taken name is [`RepositoryError::Duplicate`].
    fn create_store(
        &self,
        store: &NewStore,
    ) -> impl Future<Output = Result<StoreId, RepositoryError>> + Send;

    /// A user's lists, templates excluded, most recently updated first.
    fn list_shopping_lists(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<ShoppingList>, RepositoryError>> + Send;

    /// One list, if it exists and belongs to `user_id`.
    fn get_shopping_list(
        &self,
        user_id: UserId,
        list_id: ShoppingListId,
    ) -> impl Future<Output = Result<Option<ShoppingList>, RepositoryError>> + Send;

    /// Create a list owned by `user_id`.
    fn create_shopping_list(
        &self,
        user_id: UserId,
        list: &NewShoppingList,
    ) -> impl Future<Output = Result<ShoppingList, RepositoryError>> + Send;

    /// Apply a partial update. `None` when the list is not the user's.
    fn update_shopping_list(
        &self,
        user_id: UserId,
        list_id: ShoppingListId,
        update: &ShoppingListUpdate,
    ) -> impl Future<Output = Result<Option<ShoppingList>, RepositoryError>> + Send;

    /// Delete a list and its items. `false` when the list is not the user's.
    fn delete_shopping_list(
        &self,
        user_id: UserId,
        list_id: ShoppingListId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Put a product on a list. The caller checks ownership and the product.
    fn add_list_item(
        &self,
        list_id: ShoppingListId,
        item: &NewListItem,
    ) -> impl Future<Output = Result<ListItem, RepositoryError>> + Send;

    /// Items on a list joined with their products, ordered by the product's
    /// department (missing last), then product name, then item ID.
    fn list_products_for_list(
        &self,
        list_id: ShoppingListId,
    ) -> impl Future<Output = Result<Vec<ListProductRow>, RepositoryError>> + Send;
}

/// Convert a stored price value into a typed price row.
///
/// Missing, unparsable and negative values become unusable rows. They are
/// logged here so a bad row never fails a request.
#[must_use]
pub fn store_price(product_id: ProductId, store_id: StoreId, raw: Option<&str>) -> StorePrice {
    match raw.and_then(parse_price) {
        Some(price) => StorePrice::new(store_id, price),
        None => {
            warn!(
                %product_id,
                %store_id,
                raw_price = raw.unwrap_or("NULL"),
                "Ignoring unusable store price"
            );
            StorePrice::unusable(store_id)
        }
    }
}

/// Escape `LIKE` wildcards so a search fragment matches literally.
#[must_use]
pub fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
