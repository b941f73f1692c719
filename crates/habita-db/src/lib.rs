//! Habita Database — SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization, migrations, and reference-data seeding
//!   ([`run_migrations`], [`seed_reference_data`])
//! - SurrealDB implementations of the `habita-core` repository traits
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, seed_reference_data};
