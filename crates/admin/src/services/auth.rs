//! OAuth client for admin sign-in.
//!
//! Admins sign in through the same identity provider as the storefront; the
//! extra gate is the role check against the users table after the identity
//! is resolved (see `middleware::auth` and `routes::auth`).

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use verdant_core::{Email, EmailError};

use crate::config::OAuthConfig;

/// Errors that can occur during OAuth sign-in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// HTTP transport failure talking to the provider.
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned a non-success response.
    #[error("provider error: {0}")]
    Provider(String),

    /// The userinfo response did not include a usable email.
    #[error("provider did not return a valid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Tokens returned from the code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub id_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// The signed-in identity from the provider's userinfo endpoint.
#[derive(Debug, Clone)]
pub struct UserInfo {
    pub email: Email,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    email: String,
    name: Option<String>,
}

/// Client for the OAuth identity provider.
#[derive(Clone)]
pub struct OAuthClient {
    inner: Arc<OAuthClientInner>,
}

struct OAuthClientInner {
    client: reqwest::Client,
    issuer_url: String,
    client_id: String,
    client_secret: String,
    scopes: String,
}

impl OAuthClient {
    /// Create a new OAuth client.
    #[must_use]
    pub fn new(config: &OAuthConfig) -> Self {
        Self {
            inner: Arc::new(OAuthClientInner {
                client: reqwest::Client::new(),
                issuer_url: config.issuer_url.clone(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.expose_secret().to_string(),
                scopes: config.scopes.clone(),
            }),
        }
    }

    /// Generate the authorization URL for sign-in.
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}/authorize?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope={}&\
            state={}",
            self.inner.issuer_url,
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&self.inner.scopes),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the token exchange fails.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessToken, AuthError> {
        let url = format!("{}/oauth/token", self.inner.issuer_url);

        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", &self.inner.client_id),
            ("client_secret", &self.inner.client_secret),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self.inner.client.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AuthError::Provider(format!("token exchange failed: {text}")));
        }

        Ok(response.json().await?)
    }

    /// Resolve the signed-in identity from the provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response has no valid email.
    pub async fn fetch_userinfo(&self, access_token: &str) -> Result<UserInfo, AuthError> {
        let url = format!("{}/userinfo", self.inner.issuer_url);

        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AuthError::Provider(format!(
                "userinfo request failed ({status}): {text}"
            )));
        }

        let info: UserInfoResponse = response.json().await?;
        let email = Email::parse(&info.email)?;
        let name = info
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| {
                email
                    .as_str()
                    .split('@')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            });

        Ok(UserInfo { email, name })
    }
}

/// Generate a cryptographically secure random string for OAuth state.
#[must_use]
pub fn generate_state(length: usize) -> String {
    use rand::Rng;

    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            // SAFETY: idx is always within bounds since random_range returns 0..CHARSET.len()
            char::from(*CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect()
}
