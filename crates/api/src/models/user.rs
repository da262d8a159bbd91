//! User domain type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bestcart_core::{StoreId, UserId};

/// A BestCart user.
///
/// The password hash column is never selected into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    /// Store whose prices are shown first in search results.
    pub preferred_store_id: Option<StoreId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
