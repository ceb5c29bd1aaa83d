//! # CMS Infrastructure
//!
//! Content store adapters: PostgreSQL (sqlx) and an in-memory store.

pub mod database;
pub mod memory;

pub use database::{create_pool, postgres_repositories, run_migrations};
pub use memory::InMemoryStore;
