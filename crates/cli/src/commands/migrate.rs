//! Database migration command.
//!
//! The schema lives in `crates/storefront/migrations/` and is shared by the
//! storefront and admin binaries.

use super::{CommandError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
