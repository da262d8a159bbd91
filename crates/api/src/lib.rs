//! BestCart API library.
//!
//! Product search with per-store pricing, catalog endpoints and per-user
//! shopping lists.
//! The binary in `main.rs` wires this up against `PostgreSQL`; tests build
//! the same router over [`db::InMemoryRepository`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
