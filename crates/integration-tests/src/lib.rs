//! Integration tests for Verdant.
//!
//! # Running Tests
//!
//! These tests exercise the repository layer against a real `PostgreSQL`
//! database and are `#[ignore]`d by default. To run them:
//!
//! ```bash
//! export TEST_DATABASE_URL=postgres://localhost/verdant_test
//! cargo run -p verdant-cli -- migrate   # with ADMIN_DATABASE_URL set the same
//! cargo test -p verdant-integration-tests -- --ignored
//! ```
//!
//! Each test creates its own user and products with unique names, so tests
//! can run concurrently against a shared database.

use std::sync::atomic::{AtomicU32, Ordering};

use rust_decimal::Decimal;
use sqlx::PgPool;

use verdant_core::{Email, Money, ProductId, UserId};

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Per-process unique suffix for test fixtures.
#[must_use]
pub fn unique_suffix() -> String {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{n}", std::process::id())
}

/// Shared context for database integration tests.
pub struct TestContext {
    pub pool: PgPool,
}

impl TestContext {
    /// Connect to `TEST_DATABASE_URL`.
    ///
    /// # Panics
    ///
    /// Panics if the variable is unset or the database is unreachable —
    /// these tests are opt-in via `--ignored`.
    pub async fn new() -> Self {
        let url = std::env::var("TEST_DATABASE_URL")
            .expect("TEST_DATABASE_URL must be set for integration tests");
        let pool = PgPool::connect(&url)
            .await
            .expect("failed to connect to test database");

        Self { pool }
    }

    /// Create a test user and return its ID.
    ///
    /// # Panics
    ///
    /// Panics on database errors.
    pub async fn create_user(&self) -> UserId {
        let email = Email::parse(&format!("test-{}@verdant.test", unique_suffix()))
            .expect("valid test email");

        sqlx::query_scalar::<_, UserId>(
            "INSERT INTO users (email, name) VALUES ($1, 'Test User') RETURNING id",
        )
        .bind(&email)
        .fetch_one(&self.pool)
        .await
        .expect("failed to create test user")
    }

    /// Create a test product with the given price and stock.
    ///
    /// # Panics
    ///
    /// Panics on database errors.
    pub async fn create_product(&self, price: &str, stock: i32) -> ProductId {
        let price: Decimal = price.parse().expect("valid test price");

        sqlx::query_scalar::<_, ProductId>(
            r"
            INSERT INTO products (name, description, price, stock)
            VALUES ($1, 'test product', $2, $3)
            RETURNING id
            ",
        )
        .bind(format!("Test Product {}", unique_suffix()))
        .bind(price)
        .bind(stock)
        .fetch_one(&self.pool)
        .await
        .expect("failed to create test product")
    }

    /// Read a product's current stock.
    ///
    /// # Panics
    ///
    /// Panics on database errors.
    pub async fn stock_of(&self, id: ProductId) -> i32 {
        sqlx::query_scalar::<_, i32>("SELECT stock FROM products WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .expect("failed to read stock")
    }

    /// Read a product's current like counter.
    ///
    /// # Panics
    ///
    /// Panics on database errors.
    pub async fn likes_of(&self, id: ProductId) -> i32 {
        sqlx::query_scalar::<_, i32>("SELECT likes FROM products WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .expect("failed to read likes")
    }
}

/// Convenience constructor for money amounts in assertions.
///
/// # Panics
///
/// Panics if the literal is not a valid decimal.
#[must_use]
pub fn money(s: &str) -> Money {
    Money::new(s.parse().expect("valid decimal literal"))
}
