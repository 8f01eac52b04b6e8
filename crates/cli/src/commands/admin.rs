//! Admin role management commands.

use verdant_core::{Email, UserRole};

use super::{CommandError, connect};

/// Set a user's role by email.
///
/// The user must already exist (users are created by signing in to the
/// storefront once).
///
/// # Errors
///
/// Returns an error if the email is invalid or no such user exists.
pub async fn set_role(email: &str, role: UserRole) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::Invalid(e.to_string()))?;

    let pool = connect().await?;

    let result = sqlx::query("UPDATE users SET role = $2, updated_at = now() WHERE email = $1")
        .bind(&email)
        .bind(role)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(CommandError::Invalid(format!(
            "no user with email {email}; they must sign in to the storefront first"
        )));
    }

    tracing::info!(email = %email, role = %role, "Role updated");
    Ok(())
}
