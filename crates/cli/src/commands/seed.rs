//! Seed the database from a YAML fixture.
//!
//! The file lists stores, products (with per-store prices keyed by store
//! name) and users (with an optional preferred store name). Rows are upserted
//! by natural key (store name, product name, user email) inside a single
//! transaction, so re-running the same file is a no-op.
//!
//! ```yaml
//! stores:
//!   - name: Shufersal
//! products:
//!   - name: Milk 1L
//!     prices:
//!       Shufersal: "4.50"
//! users:
//!   - email: bob@bestcart.test
//!     preferred_store: Shufersal
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{Postgres, Transaction};
use thiserror::Error;
use tracing::{error, info};

use bestcart_api::db;
use bestcart_core::{ProductId, StoreId, parse_price};

use super::{DATABASE_URL_VAR, database_url};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{0} validation errors found")]
    Invalid(usize),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Top-level seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    #[serde(default)]
    pub stores: Vec<SeedStore>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedStore {
    pub name: String,
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedProduct {
    pub name: String,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub canonical_department: Option<String>,
    pub default_units: Option<String>,
    /// Store name to price. `null` records the store as carrying the product
    /// without a known price.
    #[serde(default)]
    pub prices: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedUser {
    pub email: String,
    pub name: Option<String>,
    pub preferred_store: Option<String>,
}

/// Row counts written by a seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub stores: usize,
    pub products: usize,
    pub prices: usize,
    pub users: usize,
}

impl SeedFile {
    /// Check cross-references and values before touching the database.
    ///
    /// Returns every problem found, not just the first.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut store_names = HashSet::new();
        for store in &self.stores {
            if store.name.trim().is_empty() {
                errors.push("store with empty name".to_string());
            } else if !store_names.insert(store.name.as_str()) {
                errors.push(format!("duplicate store: {}", store.name));
            }
        }

        let mut product_names = HashSet::new();
        for product in &self.products {
            if product.name.trim().is_empty() {
                errors.push("product with empty name".to_string());
            } else if !product_names.insert(product.name.as_str()) {
                errors.push(format!("duplicate product: {}", product.name));
            }

            for (store, price) in &product.prices {
                if !store_names.contains(store.as_str()) {
                    errors.push(format!("{}: unknown store {store}", product.name));
                }
                if let Some(raw) = price
                    && parse_price(raw).is_none()
                {
                    errors.push(format!("{}: invalid price {raw:?} at {store}", product.name));
                }
            }
        }

        let mut emails = HashSet::new();
        for user in &self.users {
            if !user.email.contains('@') {
                errors.push(format!("invalid email: {}", user.email));
            } else if !emails.insert(user.email.to_lowercase()) {
                errors.push(format!("duplicate user: {}", user.email));
            }

            if let Some(store) = &user.preferred_store
                && !store_names.contains(store.as_str())
            {
                errors.push(format!("{}: unknown preferred store {store}", user.email));
            }
        }

        errors
    }
}

/// Seed the database from `file_path`.
///
/// # Errors
///
/// Returns `SeedError` if the file is missing, unreadable or invalid, or if a
/// database operation fails. On a database error nothing is committed.
pub async fn run(file_path: &str) -> Result<SeedSummary, SeedError> {
    let database_url = database_url().ok_or(SeedError::MissingEnvVar(DATABASE_URL_VAR))?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_owned()));
    }

    info!(path = %file_path, "Loading seed file");

    // Read and validate before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let errors = seed.validate();
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(SeedError::Invalid(errors.len()));
    }

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let mut tx = pool.begin().await?;
    let summary = apply(&mut tx, &seed).await?;
    tx.commit().await?;

    Ok(summary)
}

/// Upsert everything in `seed`. The caller owns the transaction.
async fn apply(
    tx: &mut Transaction<'_, Postgres>,
    seed: &SeedFile,
) -> Result<SeedSummary, sqlx::Error> {
    let mut summary = SeedSummary::default();
    let mut store_ids: HashMap<&str, StoreId> = HashMap::new();

    for store in &seed.stores {
        let id = sqlx::query_scalar::<_, StoreId>(
            r"
            INSERT INTO bestcart.store (name, base_url)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET base_url = EXCLUDED.base_url
            RETURNING id
            ",
        )
        .bind(&store.name)
        .bind(&store.base_url)
        .fetch_one(&mut **tx)
        .await?;

        store_ids.insert(store.name.as_str(), id);
        summary.stores += 1;
    }

    for product in &seed.products {
        let product_id = sqlx::query_scalar::<_, ProductId>(
            r"
            INSERT INTO bestcart.product
                (name, description, manufacturer, canonical_department, default_units)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name) DO UPDATE SET
                description = EXCLUDED.description,
                manufacturer = EXCLUDED.manufacturer,
                canonical_department = EXCLUDED.canonical_department,
                default_units = EXCLUDED.default_units
            RETURNING id
            ",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.manufacturer)
        .bind(&product.canonical_department)
        .bind(&product.default_units)
        .fetch_one(&mut **tx)
        .await?;
        summary.products += 1;

        for (store, raw) in &product.prices {
            // Validated up front; a missing store here means validation was skipped.
            let Some(&store_id) = store_ids.get(store.as_str()) else {
                continue;
            };
            let price: Option<Decimal> = raw.as_deref().and_then(parse_price);

            sqlx::query(
                r"
                INSERT INTO bestcart.store_product (product_id, store_id, current_price)
                VALUES ($1, $2, $3)
                ON CONFLICT (product_id, store_id) DO UPDATE SET
                    current_price = EXCLUDED.current_price
                ",
            )
            .bind(product_id)
            .bind(store_id)
            .bind(price)
            .execute(&mut **tx)
            .await?;
            summary.prices += 1;
        }
    }

    for user in &seed.users {
        let preferred = user
            .preferred_store
            .as_deref()
            .and_then(|name| store_ids.get(name).copied());

        sqlx::query(
            r#"
            INSERT INTO bestcart."user" (email, name, preferred_store_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE SET
                name = EXCLUDED.name,
                preferred_store_id = EXCLUDED.preferred_store_id
            "#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(preferred)
        .execute(&mut **tx)
        .await?;
        summary.users += 1;
    }

    Ok(summary)
}
