//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. Session layer (tower-sessions with `PostgreSQL` store)
//! 3. Security headers (CSP, frame options, etc.)
//! 4. Rate limiting (governor, per route group)

pub mod auth;
pub mod rate_limit;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
