//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use verdant_core::{Email, UserId, UserRole};

/// A storefront user (domain type).
///
/// Rows are created on first OAuth sign-in; email is the identity key.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address (lowercased).
    pub email: Email,
    /// Display name from the identity provider.
    pub name: String,
    /// Site role.
    pub role: UserRole,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The signed-in user as stored in the session.
///
/// A slim copy of the user row; role is re-checked against the database on
/// admin-only paths, so a stale session cannot escalate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: UserRole,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}
