//! OAuth identity provider client.
//!
//! Verdant does not manage passwords; sign-in is delegated to a third-party
//! OIDC provider via the authorization-code flow:
//!
//! 1. Generate the authorization URL with `authorization_url()`
//! 2. Redirect the customer to the provider's login page
//! 3. The provider redirects back with an authorization code
//! 4. Exchange the code for tokens with `exchange_code()`
//! 5. Resolve the signed-in identity with `fetch_userinfo()`
//!
//! The provider endpoints are derived from the issuer URL using the
//! conventional paths (`/authorize`, `/oauth/token`, `/userinfo`).

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
    /// OIDC ID token; passed back to the provider on logout.
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
    ///
    /// # Arguments
    ///
    /// * `redirect_uri` - The callback URL to redirect to after authentication
    /// * `state` - A random string stored in the session to prevent CSRF attacks
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

    /// Generate the provider logout URL.
    ///
    /// # Arguments
    ///
    /// * `id_token` - The ID token from the current session
    /// * `post_logout_redirect_uri` - Where to redirect after logout
    #[must_use]
    pub fn logout_url(&self, id_token: &str, post_logout_redirect_uri: &str) -> String {
        format!(
            "{}/oidc/logout?\
            id_token_hint={}&\
            post_logout_redirect_uri={}",
            self.inner.issuer_url,
            urlencoding::encode(id_token),
            urlencoding::encode(post_logout_redirect_uri)
        )
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Arguments
    ///
    /// * `code` - The authorization code from the OAuth callback
    /// * `redirect_uri` - The same redirect URI used in the authorization request
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
    /// Falls back to the email's local part as the display name when the
    /// provider does not return one.
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn test_client() -> OAuthClient {
        OAuthClient::new(&OAuthConfig {
            issuer_url: "https://id.example.com".to_string(),
            client_id: "verdant".to_string(),
            client_secret: SecretString::from("test"),
            scopes: "openid email profile".to_string(),
        })
    }

    #[test]
    fn test_authorization_url_encodes_params() {
        let url = test_client().authorization_url("https://verdant.shop/auth/callback", "st ate");

        assert!(url.starts_with("https://id.example.com/authorize?"));
        assert!(url.contains("client_id=verdant"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fverdant.shop%2Fauth%2Fcallback"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("state=st%20ate"));
    }

    #[test]
    fn test_generate_state_length_and_charset() {
        let state = generate_state(32);
        assert_eq!(state.len(), 32);
        assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_state_unique() {
        assert_ne!(generate_state(32), generate_state(32));
    }
}
