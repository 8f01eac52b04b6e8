//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::auth::OAuthClient;
use crate::services::email::EmailService;

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateInitError {
    #[error("failed to configure SMTP transport: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    oauth: OAuthClient,
    mailer: EmailService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP transport cannot be configured.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, StateInitError> {
        let oauth = OAuthClient::new(&config.oauth);
        let mailer = EmailService::new(&config.email)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                oauth,
                mailer,
            }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the OAuth client.
    #[must_use]
    pub fn oauth(&self) -> &OAuthClient {
        &self.inner.oauth
    }

    /// Get a reference to the email service.
    #[must_use]
    pub fn mailer(&self) -> &EmailService {
        &self.inner.mailer
    }
}
