//! Admin OAuth sign-in route handlers.
//!
//! Same authorization-code flow as the storefront, with one extra gate: the
//! resolved identity must match a user row whose role is `admin`. Admin
//! sign-in never creates user rows.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use verdant_core::UserRole;

use crate::db::CustomerRepository;
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::{CurrentAdmin, session_keys};
use crate::services::auth::generate_state;
use crate::state::AppState;

use super::dashboard::render;

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
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
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Map a login error code to a user-facing message.
fn error_message(code: &str) -> String {
    match code {
        "denied" => "Sign-in was cancelled.".to_string(),
        "not_admin" => "This account does not have admin access.".to_string(),
        "session" => "Your session expired, please try again.".to_string(),
        _ => "Sign-in failed, please try again.".to_string(),
    }
}

/// Login page handler.
#[instrument]
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Html<String> {
    render(LoginTemplate {
        error: query.error.as_deref().map(error_message),
    })
}

/// Initiate admin OAuth login.
#[instrument(skip(state, session))]
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    let oauth_state = generate_state(32);

    if let Err(e) = session
        .insert(session_keys::OAUTH_STATE, &oauth_state)
        .await
    {
        tracing::error!("Failed to store OAuth state in session: {}", e);
        return Redirect::to("/login?error=session").into_response();
    }

    let redirect_uri = format!("{}/auth/oauth/callback", state.config().base_url);
    let auth_url = state.oauth().authorization_url(&redirect_uri, &oauth_state);

    Redirect::to(&auth_url).into_response()
}

/// Handle the admin OAuth callback.
#[instrument(skip(state, session, query))]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!("OAuth error: {} - {}", error, description);
        return Redirect::to("/login?error=denied").into_response();
    }

    let Some(code) = query.code else {
        tracing::warn!("OAuth callback missing code");
        return Redirect::to("/login?error=missing_code").into_response();
    };

    let Some(returned_state) = query.state else {
        tracing::warn!("OAuth callback missing state");
        return Redirect::to("/login?error=missing_state").into_response();
    };

    let stored_state: Option<String> = session
        .get(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();

    if stored_state.as_ref() != Some(&returned_state) {
        tracing::warn!("OAuth state mismatch");
        return Redirect::to("/login?error=invalid_state").into_response();
    }

    let _ = session.remove::<String>(session_keys::OAUTH_STATE).await;

    let redirect_uri = format!("{}/auth/oauth/callback", state.config().base_url);

    let token = match state.oauth().exchange_code(&code, &redirect_uri).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to exchange OAuth code: {}", e);
            return Redirect::to("/login?error=token_exchange").into_response();
        }
    };

    let info = match state.oauth().fetch_userinfo(&token.access_token).await {
        Ok(info) => info,
        Err(e) => {
            tracing::error!("Failed to fetch userinfo: {}", e);
            return Redirect::to("/login?error=userinfo").into_response();
        }
    };

    // Look up the user; admin sign-in never creates rows.
    let row = match CustomerRepository::new(state.pool())
        .role_by_email(&info.email)
        .await
    {
        Ok(row) => row,
        Err(e) => {
            tracing::error!("Failed to look up admin user: {}", e);
            return Redirect::to("/login?error=internal").into_response();
        }
    };

    let Some((id, name, UserRole::Admin)) = row else {
        tracing::warn!(email = %info.email, "Non-admin sign-in attempt on admin dashboard");
        return Redirect::to("/login?error=not_admin").into_response();
    };

    let admin = CurrentAdmin {
        id,
        email: info.email,
        name,
    };

    if let Err(e) = set_current_admin(&session, &admin).await {
        tracing::error!("Failed to store admin in session: {}", e);
        return Redirect::to("/login?error=session").into_response();
    }

    tracing::info!(user_id = %admin.id, "Admin authenticated");

    Redirect::to("/").into_response()
}

/// Logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::error!("Failed to clear session on logout: {}", e);
    }

    Redirect::to("/login").into_response()
}
