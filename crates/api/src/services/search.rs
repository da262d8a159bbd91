//! Product search with per-store pricing.
//!
//! A search runs in three steps:
//!
//! 1. Look up the user's preferred store and the products matching the query
//!    (concurrently).
//! 2. Fetch every matched product's store prices (fan-out, one query per
//!    product) and wait for all of them.
//! 3. Resolve each product's display price and assemble the response in the
//!    order the products were matched.
//!
//! Any failed lookup fails the whole search; partial results are never
//! returned.

use futures::future::try_join_all;
use tracing::{debug, error, instrument};

use bestcart_core::{ResolvedPrice, SearchResult, UserId, resolve_price};

use crate::db::{Repository, RepositoryError};
use crate::models::ProductSummary;

/// Maximum number of products returned by one search.
pub const SEARCH_RESULT_LIMIT: u32 = 20;

/// Search products by name and price them for a user.
///
/// `query` must already be trimmed and non-empty. A user that does not exist
/// is treated as having no preferred store.
///
/// # Errors
///
/// Returns the first `RepositoryError` raised by any lookup.
#[instrument(skip(repo))]
pub async fn search_products<R: Repository>(
    repo: &R,
    query: &str,
    user_id: UserId,
) -> Result<Vec<SearchResult>, RepositoryError> {
    let (preferred_store, products) = futures::try_join!(
        async {
            repo.preferred_store(user_id).await.inspect_err(|e| {
                error!(error = %e, %user_id, "Preferred store lookup failed");
            })
        },
        async {
            repo.find_products_by_name(query, SEARCH_RESULT_LIMIT)
                .await
                .inspect_err(|e| {
                    error!(error = %e, query, "Product name search failed");
                })
        },
    )?;

    if products.is_empty() {
        debug!("No products matched");
        return Ok(Vec::new());
    }

    let price_lists = try_join_all(products.iter().map(|product| async move {
        repo.list_prices_for_product(product.id)
            .await
            .inspect_err(|e| {
                error!(error = %e, product_id = %product.id, "Store price lookup failed");
            })
    }))
    .await?;

    debug!(
        count = products.len(),
        preferred_store = ?preferred_store,
        "Resolving display prices"
    );

    Ok(products
        .into_iter()
        .zip(price_lists)
        .map(|(product, prices)| assemble(product, &resolve_price(&prices, preferred_store)))
        .collect())
}

/// Build the response entry for one product.
#[must_use]
pub fn assemble(product: ProductSummary, resolved: &ResolvedPrice) -> SearchResult {
    SearchResult {
        id: product.id,
        name: product.name,
        manufacturer: product.manufacturer,
        display_price: resolved.formatted_price(),
        price_source: resolved.price_source,
        availability: resolved.availability(),
    }
}
