//! BestCart Core - Shared types and price resolution.
//!
//! This crate is used by every BestCart component:
//! - `api` - HTTP server for product search, the catalog and shopping lists
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Price resolution lives here so it can be tested without a
//! database and reused by anything that holds price rows.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and the search result contract
//! - [`pricing`] - Display price resolution for a single product

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use pricing::{ResolvedPrice, StorePrice, format_price, parse_price, resolve_price};
pub use types::*;
