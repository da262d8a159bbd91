//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::Repository;

/// Application state shared across all handlers.
///
/// Generic over the repository so the same router serves `PostgreSQL` in
/// production and in-memory data in tests. Cloning is cheap (one `Arc`).
pub struct AppState<R> {
    inner: Arc<AppStateInner<R>>,
}

struct AppStateInner<R> {
    config: ApiConfig,
    repo: R,
}

// Manual impl: `R` itself need not be `Clone`.
impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Repository> AppState<R> {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ApiConfig, repo: R) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, repo }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the repository.
    #[must_use]
    pub fn repo(&self) -> &R {
        &self.inner.repo
    }
}
