//! Admin authentication extractor.
//!
//! Every admin route requires a signed-in user whose role is `admin`. The
//! role is re-checked against the users table per request, so a demotion
//! takes effect without waiting for session expiry.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use verdant_core::UserRole;

use crate::db::CustomerRepository;
use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;

/// Extractor that requires an authenticated admin.
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Rejection for failed admin authentication.
pub enum AdminAuthRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// The user is signed in but not an admin.
    Forbidden,
    /// Session machinery unavailable or the role check failed.
    Internal,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Forbidden => {
                (StatusCode::FORBIDDEN, "Admin access required").into_response()
            }
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::Internal)?;

        let admin: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or(AdminAuthRejection::RedirectToLogin)?;

        // Re-check the role on every request
        let role = CustomerRepository::new(state.pool())
            .role_by_id(admin.id)
            .await
            .map_err(|e| {
                tracing::error!("Admin role check failed: {e}");
                AdminAuthRejection::Internal
            })?;

        match role {
            Some(UserRole::Admin) => Ok(Self(admin)),
            Some(UserRole::User) => Err(AdminAuthRejection::Forbidden),
            None => Err(AdminAuthRejection::RedirectToLogin),
        }
    }
}

/// Helper to set the current admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    Ok(())
}
