//! Database operations for the storefront.
//!
//! # Tables
//!
//! - `users` - Customers, created on first OAuth sign-in
//! - `session` - Tower-sessions storage
//! - `categories`, `products`, `product_colors` - Catalog
//! - `cart_items` - Cart lines, keyed (user, product, color)
//! - `favorites` - User-to-product favorites
//! - `orders`, `order_items` - Orders with denormalized item snapshots
//! - `notifications` - Per-user notification feed
//!
//! The storefront connects with the read-mostly application role; privileged
//! writes (catalog management, order status) happen through the admin binary,
//! which uses the service role.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p verdant-cli -- migrate
//! ```

pub mod cart;
pub mod categories;
pub mod favorites;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use cart::CartRepository;
pub use categories::CategoryRepository;
pub use favorites::FavoriteRepository;
pub use notifications::NotificationRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

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

    /// Constraint violation (e.g., unique email, category in use).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Not enough stock to cover a requested quantity.
    #[error("insufficient stock for {product}")]
    InsufficientStock {
        /// Name of the product that ran out.
        product: String,
    },
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
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
