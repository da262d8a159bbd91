//! Product search response contract.
//!
//! These shapes are what the mobile search screen consumes, so field names are
//! serialized in camelCase and the price source as a snake_case tag.

use serde::{Deserialize, Serialize};

use super::ProductId;

/// How a search result's display price was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// Price recorded at the user's preferred store.
    FavoriteStore,
    /// Mean of every parseable price across stores.
    Average,
    /// No store has a usable price.
    None,
}

impl PriceSource {
    /// Wire tag for this source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FavoriteStore => "favorite_store",
            Self::Average => "average",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Availability summary shown next to each search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub is_at_favorite_store: bool,
    /// Stores carrying the product other than the one whose price is shown.
    pub other_store_count: usize,
}

/// One product in a search response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: ProductId,
    pub name: String,
    pub manufacturer: Option<String>,
    /// Two-decimal price string (e.g. `"4.50"`), or `null` when unpriced.
    pub display_price: Option<String>,
    pub price_source: PriceSource,
    pub availability: Availability,
}
