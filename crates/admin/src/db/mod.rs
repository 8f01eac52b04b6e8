//! Database operations for the admin dashboard.
//!
//! Connects to the same database as the storefront, but with the privileged
//! service role: catalog CRUD, order management, and exports all live here.
//!
//! # Migrations
//!
//! The schema is owned by the storefront migrations
//! (`crates/storefront/migrations/`), run via:
//! ```bash
//! cargo run -p verdant-cli -- migrate
//! ```

pub mod activity_log;
pub mod categories;
pub mod customers;
pub mod orders;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use activity_log::ActivityLogRepository;
pub use categories::CategoryRepository;
pub use customers::CustomerRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., category still has products).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
