//! `PostgreSQL` repository.
//!
//! Queries are runtime-checked (`query_as` with `bind`) so the crate builds
//! without a live database. Text ordering uses `COLLATE "C"` (byte order) so
//! results do not depend on the database's locale.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};

use bestcart_core::{ProductId, ShoppingListId, StoreId, StorePrice, UserId};

use super::{Repository, RepositoryError, escape_like, store_price};
use crate::models::{
    ListItem, ListProductRow, NewListItem, NewProduct, NewShoppingList, NewStore, Product,
    ProductSummary, ShoppingList, ShoppingListUpdate, Store, User,
};

const PREFERRED_STORE_SQL: &str = r#"
    SELECT preferred_store_id
    FROM bestcart."user"
    WHERE id = $1
"#;

const FIND_PRODUCTS_SQL: &str = r#"
    SELECT id, name, manufacturer
    FROM bestcart.product
    WHERE name ILIKE $1 ESCAPE '\'
    ORDER BY name COLLATE "C" ASC, id ASC
    LIMIT $2
"#;

const LIST_PRICES_SQL: &str = r"
    SELECT store_id, current_price::text AS current_price
    FROM bestcart.store_product
    WHERE product_id = $1
    ORDER BY store_id ASC
";

const LIST_PRODUCTS_SQL: &str = r#"
    SELECT id, name, description, manufacturer, canonical_department,
           default_units, created_at, updated_at
    FROM bestcart.product
    ORDER BY name COLLATE "C" ASC, id ASC
"#;

const GET_PRODUCT_SQL: &str = r"
    SELECT id, name, description, manufacturer, canonical_department,
           default_units, created_at, updated_at
    FROM bestcart.product
    WHERE id = $1
";

const LIST_STORES_SQL: &str = r#"
    SELECT id, name, base_url, created_at, updated_at
    FROM bestcart.store
    ORDER BY name COLLATE "C" ASC, id ASC
"#;

const GET_STORE_SQL: &str = r"
    SELECT id, name, base_url, created_at, updated_at
    FROM bestcart.store
    WHERE id = $1
";

const GET_USER_SQL: &str = r#"
    SELECT id, email, name, preferred_store_id, created_at, updated_at
    FROM bestcart."user"
    WHERE id = $1
"#;

const CREATE_PRODUCT_SQL: &str = r"
    INSERT INTO bestcart.product
        (name, description, manufacturer, canonical_department, default_units)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING id
";

const CREATE_STORE_SQL: &str = r"
    INSERT INTO bestcart.store (name, base_url)
    VALUES ($1, $2)
    RETURNING id
";

const LIST_SHOPPING_LISTS_SQL: &str = r"
    SELECT id, user_id, name, description, is_template, created_at, updated_at
    FROM bestcart.shopping_list
    WHERE user_id = $1 AND NOT is_template
    ORDER BY updated_at DESC, id DESC
";

const GET_SHOPPING_LIST_SQL: &str = r"
    SELECT id, user_id, name, description, is_template, created_at, updated_at
    FROM bestcart.shopping_list
    WHERE id = $1 AND user_id = $2
";

const CREATE_SHOPPING_LIST_SQL: &str = r"
    INSERT INTO bestcart.shopping_list (user_id, name, description, is_template)
    VALUES ($1, $2, $3, $4)
    RETURNING id, user_id, name, description, is_template, created_at, updated_at
";

// $4 says whether $5 replaces the description.
const UPDATE_SHOPPING_LIST_SQL: &str = r"
    UPDATE bestcart.shopping_list
    SET name = COALESCE($3, name),
        description = CASE WHEN $4 THEN $5 ELSE description END,
        is_template = COALESCE($6, is_template)
    WHERE id = $1 AND user_id = $2
    RETURNING id, user_id, name, description, is_template, created_at, updated_at
";

const DELETE_SHOPPING_LIST_SQL: &str = r"
    DELETE FROM bestcart.shopping_list
    WHERE id = $1 AND user_id = $2
";

const ADD_LIST_ITEM_SQL: &str = r"
    INSERT INTO bestcart.list_item
        (shopping_list_id, product_id, department_grouping, quantity, units, notes)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING id, shopping_list_id, product_id, department_grouping, quantity,
              units, is_checked, notes, added_at
";

const LIST_PRODUCTS_FOR_LIST_SQL: &str = r#"
    SELECT li.id AS item_id,
           li.shopping_list_id,
           li.department_grouping,
           li.quantity,
           li.units,
           li.is_checked,
           li.notes,
           li.added_at,
           p.id AS product_id,
           p.name,
           p.description,
           p.manufacturer,
           p.canonical_department,
           p.default_units,
           p.created_at AS product_created_at,
           p.updated_at AS product_updated_at
    FROM bestcart.list_item li
    INNER JOIN bestcart.product p ON li.product_id = p.id
    WHERE li.shopping_list_id = $1
    ORDER BY p.canonical_department COLLATE "C" ASC NULLS LAST,
             p.name COLLATE "C" ASC,
             li.id ASC
"#;

/// Raw `store_product` row. The price is read as text and parsed by
/// [`store_price`], so a malformed value is skipped instead of failing the decode.
#[derive(sqlx::FromRow)]
struct PriceRow {
    store_id: StoreId,
    current_price: Option<String>,
}

/// Trimmed text, or `None` when blank.
fn filled(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Repository backed by the `bestcart` schema.
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    /// Create a new repository over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Repository for PgRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn preferred_store(&self, user_id: UserId) -> Result<Option<StoreId>, RepositoryError> {
        let preferred = sqlx::query_scalar::<_, Option<StoreId>>(PREFERRED_STORE_SQL)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(preferred.flatten())
    }

    #[instrument(skip(self))]
    async fn find_products_by_name(
        &self,
        fragment: &str,
        limit: u32,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let pattern = format!("%{}%", escape_like(fragment));

        let products = sqlx::query_as::<_, ProductSummary>(FIND_PRODUCTS_SQL)
            .bind(&pattern)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Matched products");
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn list_prices_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<StorePrice>, RepositoryError> {
        let rows = sqlx::query_as::<_, PriceRow>(LIST_PRICES_SQL)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| store_price(product_id, row.store_id, row.current_price.as_deref()))
            .collect())
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(LIST_PRODUCTS_SQL)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(GET_PRODUCT_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    #[instrument(skip(self))]
    async fn list_stores(&self) -> Result<Vec<Store>, RepositoryError> {
        let stores = sqlx::query_as::<_, Store>(LIST_STORES_SQL)
            .fetch_all(&self.pool)
            .await?;

        Ok(stores)
    }

    #[instrument(skip(self))]
    async fn get_store(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(GET_STORE_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(store)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(GET_USER_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    async fn create_product(&self, product: &NewProduct) -> Result<ProductId, RepositoryError> {
        let id = sqlx::query_scalar::<_, ProductId>(CREATE_PRODUCT_SQL)
            .bind(product.name.trim())
            .bind(filled(product.description.as_deref()))
            .bind(filled(product.manufacturer.as_deref()))
            .bind(filled(product.canonical_department.as_deref()))
            .bind(filled(product.default_units.as_deref()))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::on_unique_violation(e, "product name"))?;

        debug!(%id, "Created product");
        Ok(id)
    }

    #[instrument(skip(self, store), fields(name = %store.name))]
    async fn create_store(&self, store: &NewStore) -> Result<StoreId, RepositoryError> {
        let id = sqlx::query_scalar::<_, StoreId>(CREATE_STORE_SQL)
            .bind(store.name.trim())
            .bind(filled(store.base_url.as_deref()))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::on_unique_violation(e, "store name"))?;

        debug!(%id, "Created store");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn list_shopping_lists(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ShoppingList>, RepositoryError> {
        let lists = sqlx::query_as::<_, ShoppingList>(LIST_SHOPPING_LISTS_SQL)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(lists)
    }

    #[instrument(skip(self))]
    async fn get_shopping_list(
        &self,
        user_id: UserId,
        list_id: ShoppingListId,
    ) -> Result<Option<ShoppingList>, RepositoryError> {
        let list = sqlx::query_as::<_, ShoppingList>(GET_SHOPPING_LIST_SQL)
            .bind(list_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(list)
    }

    #[instrument(skip(self, list))]
    async fn create_shopping_list(
        &self,
        user_id: UserId,
        list: &NewShoppingList,
    ) -> Result<ShoppingList, RepositoryError> {
        let created = sqlx::query_as::<_, ShoppingList>(CREATE_SHOPPING_LIST_SQL)
            .bind(user_id)
            .bind(list.name.trim())
            .bind(filled(list.description.as_deref()))
            .bind(list.is_template)
            .fetch_one(&self.pool)
            .await?;

        debug!(list_id = %created.id, "Created shopping list");
        Ok(created)
    }

    #[instrument(skip(self, update))]
    async fn update_shopping_list(
        &self,
        user_id: UserId,
        list_id: ShoppingListId,
        update: &ShoppingListUpdate,
    ) -> Result<Option<ShoppingList>, RepositoryError> {
        let updated = sqlx::query_as::<_, ShoppingList>(UPDATE_SHOPPING_LIST_SQL)
            .bind(list_id)
            .bind(user_id)
            .bind(update.name.as_deref().map(str::trim))
            .bind(update.description.is_some())
            .bind(filled(update.description.as_deref()))
            .bind(update.is_template)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete_shopping_list(
        &self,
        user_id: UserId,
        list_id: ShoppingListId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(DELETE_SHOPPING_LIST_SQL)
            .bind(list_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, item), fields(product_id = %item.product_id))]
    async fn add_list_item(
        &self,
        list_id: ShoppingListId,
        item: &NewListItem,
    ) -> Result<ListItem, RepositoryError> {
        let added = sqlx::query_as::<_, ListItem>(ADD_LIST_ITEM_SQL)
            .bind(list_id)
            .bind(item.product_id)
            .bind(filled(item.department_grouping.as_deref()))
            .bind(item.quantity.unwrap_or(Decimal::ONE))
            .bind(filled(item.units.as_deref()))
            .bind(filled(item.notes.as_deref()))
            .fetch_one(&self.pool)
            .await?;

        Ok(added)
    }

    #[instrument(skip(self))]
    async fn list_products_for_list(
        &self,
        list_id: ShoppingListId,
    ) -> Result<Vec<ListProductRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, ListProductRow>(LIST_PRODUCTS_FOR_LIST_SQL)
            .bind(list_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_COLUMNS: &str = "id, user_id, name, description, is_template, created_at, updated_at";

    fn squash(sql: &str) -> String {
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_user_table_is_quoted() {
        for sql in [PREFERRED_STORE_SQL, GET_USER_SQL] {
            assert!(squash(sql).contains(r#"FROM bestcart."user" WHERE id = $1"#));
        }
    }

    #[test]
    fn test_user_query_never_selects_password_hash() {
        assert!(!GET_USER_SQL.contains("password_hash"));
    }

    #[test]
    fn test_product_search_escapes_and_limits() {
        let sql = squash(FIND_PRODUCTS_SQL);
        assert!(sql.contains(r"WHERE name ILIKE $1 ESCAPE '\'"));
        assert!(sql.ends_with("LIMIT $2"));
    }

    #[test]
    fn test_text_ordering_is_byte_order() {
        for sql in [FIND_PRODUCTS_SQL, LIST_PRODUCTS_SQL] {
            assert!(squash(sql).contains(r#"ORDER BY name COLLATE "C" ASC, id ASC"#));
        }
        assert!(squash(LIST_STORES_SQL).contains(r#"ORDER BY name COLLATE "C" ASC"#));
        assert!(squash(LIST_PRODUCTS_FOR_LIST_SQL).contains(
            r#"ORDER BY p.canonical_department COLLATE "C" ASC NULLS LAST, p.name COLLATE "C" ASC, li.id ASC"#
        ));
    }

    #[test]
    fn test_prices_are_read_as_text() {
        assert!(LIST_PRICES_SQL.contains("current_price::text AS current_price"));
    }

    #[test]
    fn test_list_queries_are_scoped_to_the_owner() {
        for sql in [
            GET_SHOPPING_LIST_SQL,
            UPDATE_SHOPPING_LIST_SQL,
            DELETE_SHOPPING_LIST_SQL,
        ] {
            assert!(squash(sql).contains("WHERE id = $1 AND user_id = $2"), "{sql}");
        }
        assert!(LIST_SHOPPING_LISTS_SQL.contains("NOT is_template"));
    }

    #[test]
    fn test_list_rows_return_every_column() {
        for sql in [
            LIST_SHOPPING_LISTS_SQL,
            GET_SHOPPING_LIST_SQL,
            CREATE_SHOPPING_LIST_SQL,
            UPDATE_SHOPPING_LIST_SQL,
        ] {
            assert!(squash(sql).contains(LIST_COLUMNS), "{sql}");
        }
    }

    #[test]
    fn test_filled_drops_blank_text() {
        assert_eq!(filled(Some("  Dairy ")), Some("Dairy"));
        assert_eq!(filled(Some("   ")), None);
        assert_eq!(filled(None), None);
    }
}
