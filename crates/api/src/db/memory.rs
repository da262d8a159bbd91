//! In-memory repository.
//!
//! Seed data is added up front with the `with_*` methods. Writes made through
//! the [`Repository`] trait land in the same shared state, so clones of one
//! repository see each other's lists. Failure injection lets tests exercise
//! the error paths of the search aggregator without a database.
//!
//! Text ordering compares bytes, matching the `COLLATE "C"` ordering of
//! [`super::PgRepository`].

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use bestcart_core::{ListItemId, ProductId, ShoppingListId, StoreId, StorePrice, UserId};

use super::{Repository, RepositoryError, store_price};
use crate::models::{
    ListItem, ListProductRow, NewListItem, NewProduct, NewShoppingList, NewStore, Product,
    ProductSummary, ShoppingList, ShoppingListUpdate, Store, User,
};

#[derive(Debug, Clone)]
struct PriceEntry {
    product_id: ProductId,
    store_id: StoreId,
    raw: Option<String>,
}

#[derive(Debug, Default)]
struct Data {
    products: Vec<Product>,
    stores: Vec<Store>,
    users: Vec<User>,
    prices: Vec<PriceEntry>,
    lists: Vec<ShoppingList>,
    items: Vec<ListItem>,
    unavailable: bool,
    failing_price_lookups: HashSet<ProductId>,
}

impl Data {
    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn owned_list_mut(
        &mut self,
        user_id: UserId,
        list_id: ShoppingListId,
    ) -> Option<&mut ShoppingList> {
        self.lists
            .iter_mut()
            .find(|list| list.id == list_id && list.user_id == user_id)
    }
}

/// Next `SERIAL` value after the largest ID in use.
fn next_id(ids: impl Iterator<Item = i32>) -> i32 {
    ids.max().unwrap_or(0) + 1
}

/// Trimmed owned text, or `None` when blank.
fn filled(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Ascending order with `None` after every value, as `NULLS LAST` sorts.
fn nulls_last(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Repository over in-process data.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    data: Arc<RwLock<Data>>,
    created_at: DateTime<Utc>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(Data::default())),
            created_at: Utc::now(),
        }
    }

    // A panic while a guard is held leaves plain data behind, so a poisoned
    // lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, Data> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Data> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a store.
    #[must_use]
    pub fn with_store(self, id: i32, name: &str) -> Self {
        let store = Store {
            id: StoreId::new(id),
            name: name.to_owned(),
            base_url: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        };
        self.write().stores.push(store);
        self
    }

    /// Add a product with only the fields search needs.
    #[must_use]
    pub fn with_product(self, id: i32, name: &str, manufacturer: Option<&str>) -> Self {
        let product = Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            description: None,
            manufacturer: manufacturer.map(str::to_owned),
            canonical_department: None,
            default_units: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        };
        self.with_catalog_product(product)
    }

    /// Add a fully specified product (department, units, description).
    #[must_use]
    pub fn with_catalog_product(self, product: Product) -> Self {
        self.write().products.push(product);
        self
    }

    /// Record a store's price for a product, as the stored text value.
    #[must_use]
    pub fn with_price(self, product_id: i32, store_id: i32, price: &str) -> Self {
        self.with_raw_price(product_id, store_id, Some(price))
    }

    /// Record a store price that may be missing (`NULL`) or malformed.
    #[must_use]
    pub fn with_raw_price(self, product_id: i32, store_id: i32, raw: Option<&str>) -> Self {
        self.write().prices.push(PriceEntry {
            product_id: ProductId::new(product_id),
            store_id: StoreId::new(store_id),
            raw: raw.map(str::to_owned),
        });
        self
    }

    /// Add a user with an optional preferred store.
    #[must_use]
    pub fn with_user(self, id: i32, preferred_store: Option<i32>) -> Self {
        let user = User {
            id: UserId::new(id),
            email: format!("user{id}@bestcart.test"),
            name: None,
            preferred_store_id: preferred_store.map(StoreId::new),
            created_at: self.created_at,
            updated_at: self.created_at,
        };
        self.write().users.push(user);
        self
    }

    /// Make every operation fail as if the database were unreachable.
    #[must_use]
    pub fn unavailable(self) -> Self {
        self.write().unavailable = true;
        self
    }

    /// Make price lookups for one product fail.
    #[must_use]
    pub fn with_failing_price_lookup(self, product_id: i32) -> Self {
        self.write()
            .failing_price_lookups
            .insert(ProductId::new(product_id));
        self
    }
}

impl Repository for InMemoryRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.read().check_available()
    }

    async fn preferred_store(&self, user_id: UserId) -> Result<Option<StoreId>, RepositoryError> {
        let data = self.read();
        data.check_available()?;
        Ok(data
            .users
            .iter()
            .find(|user| user.id == user_id)
            .and_then(|user| user.preferred_store_id))
    }

    async fn find_products_by_name(
        &self,
        fragment: &str,
        limit: u32,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let data = self.read();
        data.check_available()?;
        let needle = fragment.to_lowercase();

        let mut matches: Vec<&Product> = data
            .products
            .iter()
            .filter(|product| product.name.to_lowercase().contains(&needle))
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(matches
            .into_iter()
            .take(limit)
            .map(ProductSummary::from)
            .collect())
    }

    async fn list_prices_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<StorePrice>, RepositoryError> {
        let data = self.read();
        data.check_available()?;
        if data.failing_price_lookups.contains(&product_id) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut entries: Vec<&PriceEntry> = data
            .prices
            .iter()
            .filter(|entry| entry.product_id == product_id)
            .collect();
        entries.sort_by_key(|entry| entry.store_id);

        Ok(entries
            .into_iter()
            .map(|entry| store_price(product_id, entry.store_id, entry.raw.as_deref()))
            .collect())
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let data = self.read();
        data.check_available()?;
        let mut products = data.products.clone();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let data = self.read();
        data.check_available()?;
        Ok(data.products.iter().find(|p| p.id == id).cloned())
    }

    async fn list_stores(&self) -> Result<Vec<Store>, RepositoryError> {
        let data = self.read();
        data.check_available()?;
        let mut stores = data.stores.clone();
        stores.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(stores)
    }

    async fn get_store(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let data = self.read();
        data.check_available()?;
        Ok(data.stores.iter().find(|s| s.id == id).cloned())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let data = self.read();
        data.check_available()?;
        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_product(&self, product: &NewProduct) -> Result<ProductId, RepositoryError> {
        let mut data = self.write();
        data.check_available()?;

        let name = product.name.trim();
        if data.products.iter().any(|p| p.name == name) {
            return Err(RepositoryError::Duplicate("product name"));
        }

        let now = Utc::now();
        let id = ProductId::new(next_id(data.products.iter().map(|p| p.id.as_i32())));
        data.products.push(Product {
            id,
            name: name.to_owned(),
            description: filled(product.description.as_deref()),
            manufacturer: filled(product.manufacturer.as_deref()),
            canonical_department: filled(product.canonical_department.as_deref()),
            default_units: filled(product.default_units.as_deref()),
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn create_store(&self, store: &NewStore) -> Result<StoreId, RepositoryError> {
        let mut data = self.write();
        data.check_available()?;

        let name = store.name.trim();
        if data.stores.iter().any(|s| s.name == name) {
            return Err(RepositoryError::Duplicate("store name"));
        }

        let now = Utc::now();
        let id = StoreId::new(next_id(data.stores.iter().map(|s| s.id.as_i32())));
        data.stores.push(Store {
            id,
            name: name.to_owned(),
            base_url: filled(store.base_url.as_deref()),
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn list_shopping_lists(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ShoppingList>, RepositoryError> {
        let data = self.read();
        data.check_available()?;

        let mut lists: Vec<ShoppingList> = data
            .lists
            .iter()
            .filter(|list| list.user_id == user_id && !list.is_template)
            .cloned()
            .collect();
        lists.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(lists)
    }

    async fn get_shopping_list(
        &self,
        user_id: UserId,
        list_id: ShoppingListId,
    ) -> Result<Option<ShoppingList>, RepositoryError> {
        let data = self.read();
        data.check_available()?;
        Ok(data
            .lists
            .iter()
            .find(|list| list.id == list_id && list.user_id == user_id)
            .cloned())
    }

    async fn create_shopping_list(
        &self,
        user_id: UserId,
        list: &NewShoppingList,
    ) -> Result<ShoppingList, RepositoryError> {
        let mut data = self.write();
        data.check_available()?;

        let now = Utc::now();
        let created = ShoppingList {
            id: ShoppingListId::new(next_id(data.lists.iter().map(|l| l.id.as_i32()))),
            user_id,
            name: list.name.trim().to_owned(),
            description: filled(list.description.as_deref()),
            is_template: list.is_template,
            created_at: now,
            updated_at: now,
        };
        data.lists.push(created.clone());
        Ok(created)
    }

    async fn update_shopping_list(
        &self,
        user_id: UserId,
        list_id: ShoppingListId,
        update: &ShoppingListUpdate,
    ) -> Result<Option<ShoppingList>, RepositoryError> {
        let mut data = self.write();
        data.check_available()?;

        let Some(list) = data.owned_list_mut(user_id, list_id) else {
            return Ok(None);
        };
        if let Some(name) = &update.name {
            name.trim().clone_into(&mut list.name);
        }
        if update.description.is_some() {
            list.description = filled(update.description.as_deref());
        }
        if let Some(is_template) = update.is_template {
            list.is_template = is_template;
        }
        list.updated_at = Utc::now();
        Ok(Some(list.clone()))
    }

    async fn delete_shopping_list(
        &self,
        user_id: UserId,
        list_id: ShoppingListId,
    ) -> Result<bool, RepositoryError> {
        let mut data = self.write();
        data.check_available()?;

        if data.owned_list_mut(user_id, list_id).is_none() {
            return Ok(false);
        }
        data.lists.retain(|list| list.id != list_id);
        data.items.retain(|item| item.shopping_list_id != list_id);
        Ok(true)
    }

    async fn add_list_item(
        &self,
        list_id: ShoppingListId,
        item: &NewListItem,
    ) -> Result<ListItem, RepositoryError> {
        let mut data = self.write();
        data.check_available()?;

        let added = ListItem {
            id: ListItemId::new(next_id(data.items.iter().map(|i| i.id.as_i32()))),
            shopping_list_id: list_id,
            product_id: item.product_id,
            department_grouping: filled(item.department_grouping.as_deref()),
            quantity: item.quantity.unwrap_or(Decimal::ONE),
            units: filled(item.units.as_deref()),
            is_checked: false,
            notes: filled(item.notes.as_deref()),
            added_at: Utc::now(),
        };
        data.items.push(added.clone());
        Ok(added)
    }

    async fn list_products_for_list(
        &self,
        list_id: ShoppingListId,
    ) -> Result<Vec<ListProductRow>, RepositoryError> {
        let data = self.read();
        data.check_available()?;

        let mut rows: Vec<ListProductRow> = data
            .items
            .iter()
            .filter(|item| item.shopping_list_id == list_id)
            .filter_map(|item| {
                let product = data.products.iter().find(|p| p.id == item.product_id)?;
                Some(ListProductRow {
                    item_id: item.id,
                    shopping_list_id: item.shopping_list_id,
                    department_grouping: item.department_grouping.clone(),
                    quantity: item.quantity,
                    units: item.units.clone(),
                    is_checked: item.is_checked,
                    notes: item.notes.clone(),
                    added_at: item.added_at,
                    product_id: product.id,
                    name: product.name.clone(),
                    description: product.description.clone(),
                    manufacturer: product.manufacturer.clone(),
                    canonical_department: product.canonical_department.clone(),
                    default_units: product.default_units.clone(),
                    product_created_at: product.created_at,
                    product_updated_at: product.updated_at,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            nulls_last(
                a.canonical_department.as_deref(),
                b.canonical_department.as_deref(),
            )
            .then_with(|| a.name.cmp(&b.name))
            .then(a.item_id.cmp(&b.item_id))
        });
        Ok(rows)
    }
}
