//! OAuth sign-in route handlers.
//!
//! Handles the authorization-code flow against the configured identity
//! provider:
//! - Login: redirects to the provider's authorization page
//! - Callback: validates state, exchanges the code, resolves userinfo, and
//!   upserts the local user row
//! - Logout: clears the session

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::services::auth::generate_state;
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub user: Option<CurrentUser>,
    pub error: Option<String>,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    pub error: Option<String>,
}

/// Query parameters from the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

/// Map a login error code to a user-facing message.
fn error_message(code: &str) -> String {
    match code {
        "denied" => "Sign-in was cancelled.".to_string(),
        "session" => "Your session expired, please try again.".to_string(),
        _ => "Sign-in failed, please try again.".to_string(),
    }
}

/// Login page handler.
///
/// # Route
///
/// `GET /auth/login`
#[instrument]
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> LoginTemplate {
    LoginTemplate {
        user: None,
        error: query.error.as_deref().map(error_message),
    }
}

/// Initiate OAuth login.
///
/// Generates a state parameter, stores it in the session, and redirects to
/// the provider's authorization page.
///
/// # Route
///
/// `GET /auth/oauth/login`
#[instrument(skip(state, session))]
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    // Generate CSRF state
    let oauth_state = generate_state(32);

    // Store in session for validation on callback
    if let Err(e) = session
        .insert(session_keys::OAUTH_STATE, &oauth_state)
        .await
    {
        tracing::error!("Failed to store OAuth state in session: {}", e);
        return Redirect::to("/auth/login?error=session").into_response();
    }

    // Build the redirect URI
    let redirect_uri = format!("{}/auth/oauth/callback", state.config().base_url);

    // Generate and redirect to authorization URL
    let auth_url = state.oauth().authorization_url(&redirect_uri, &oauth_state);

    Redirect::to(&auth_url).into_response()
}

/// Handle the OAuth callback.
///
/// Validates the state parameter, exchanges the authorization code for
/// tokens, resolves the identity via userinfo, and upserts the local user.
///
/// # Route
///
/// `GET /auth/oauth/callback`
#[instrument(skip(state, session, query))]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    // Check for OAuth errors from the provider
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!("OAuth error: {} - {}", error, description);
        return Redirect::to("/auth/login?error=denied").into_response();
    }

    // Verify we have an authorization code
    let Some(code) = query.code else {
        tracing::warn!("OAuth callback missing code");
        return Redirect::to("/auth/login?error=missing_code").into_response();
    };

    // Verify state parameter (CSRF protection)
    let Some(returned_state) = query.state else {
        tracing::warn!("OAuth callback missing state");
        return Redirect::to("/auth/login?error=missing_state").into_response();
    };

    let stored_state: Option<String> = session
        .get(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();

    if stored_state.as_ref() != Some(&returned_state) {
        tracing::warn!("OAuth state mismatch");
        return Redirect::to("/auth/login?error=invalid_state").into_response();
    }

    // Clear the stored state (one-time use)
    let _ = session.remove::<String>(session_keys::OAUTH_STATE).await;

    // Build redirect URI (must match the one used in authorization request)
    let redirect_uri = format!("{}/auth/oauth/callback", state.config().base_url);

    // Exchange code for tokens
    let token = match state.oauth().exchange_code(&code, &redirect_uri).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to exchange OAuth code: {}", e);
            return Redirect::to("/auth/login?error=token_exchange").into_response();
        }
    };

    // Resolve the signed-in identity
    let info = match state.oauth().fetch_userinfo(&token.access_token).await {
        Ok(info) => info,
        Err(e) => {
            tracing::error!("Failed to fetch userinfo: {}", e);
            return Redirect::to("/auth/login?error=userinfo").into_response();
        }
    };

    // Create or refresh the local user row
    let user = match UserRepository::new(state.pool())
        .upsert_from_oauth(&info.email, &info.name)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Failed to upsert user: {}", e);
            return Redirect::to("/auth/login?error=internal").into_response();
        }
    };

    let current = CurrentUser::from(&user);
    if let Err(e) = set_current_user(&session, &current).await {
        tracing::error!("Failed to store user in session: {}", e);
        return Redirect::to("/auth/login?error=session").into_response();
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "User authenticated");

    Redirect::to("/account").into_response()
}

/// Logout.
///
/// Clears the session and redirects to the home page.
///
/// # Route
///
/// `POST /auth/logout`
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session on logout: {}", e);
    }

    clear_sentry_user();

    Redirect::to("/").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_known_codes() {
        assert!(error_message("denied").contains("cancelled"));
        assert!(error_message("session").contains("expired"));
    }

    #[test]
    fn test_error_message_fallback() {
        assert!(error_message("token_exchange").contains("failed"));
    }
}
