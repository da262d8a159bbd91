//! Core types for BestCart.

pub mod id;
pub mod search;

pub use id::*;
pub use search::{Availability, PriceSource, SearchResult};
