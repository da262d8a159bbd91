//! Business logic that sits between route handlers and the repository.

pub mod search;

pub use search::{SEARCH_RESULT_LIMIT, search_products};
