//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::models::{Category, Product};
use crate::services::auth::OAuthClient;
use crate::services::email::EmailService;

/// How long the home-page catalog snapshot stays cached.
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(60);

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateInitError {
    #[error("failed to configure SMTP transport: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Cached snapshot of the catalog data shown on the home page.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub featured: Vec<Product>,
    pub categories: Vec<Category>,
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    oauth: OAuthClient,
    mailer: EmailService,
    catalog_cache: Cache<&'static str, Arc<CatalogSnapshot>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP transport cannot be configured.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StateInitError> {
        let oauth = OAuthClient::new(&config.oauth);
        let mailer = EmailService::new(&config.email)?;
        let catalog_cache = Cache::builder()
            .max_capacity(4)
            .time_to_live(CATALOG_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                oauth,
                mailer,
                catalog_cache,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
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

    /// Get a reference to the home-page catalog cache.
    #[must_use]
    pub fn catalog_cache(&self) -> &Cache<&'static str, Arc<CatalogSnapshot>> {
        &self.inner.catalog_cache
    }
}
