//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /products               - Product listing (category filter, pagination)
//! GET  /products/{id}          - Product detail
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update            - Set quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove line (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Checkout form
//! POST /checkout               - Place order (cart -> order conversion)
//!
//! # Favorites
//! GET  /favorites              - Favorited products
//! POST /favorites/toggle       - Toggle favorite (returns button fragment)
//!
//! # Auth (third-party OAuth)
//! GET  /auth/login             - Login page
//! GET  /auth/oauth/login       - Redirect to identity provider
//! GET  /auth/oauth/callback    - Handle OAuth callback
//! POST /auth/logout            - Logout
//!
//! # Account (requires auth)
//! GET  /account                - Account overview
//! GET  /account/orders         - Order history
//! GET  /account/orders/{id}    - Order detail / confirmation
//! GET  /account/notifications  - Notification feed
//! POST /account/notifications/read-all   - Mark all read
//! POST /account/notifications/{id}/read  - Mark one read
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod favorites;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page))
        .route("/logout", post(auth::logout))
        .route("/oauth/login", get(auth::login))
        .route("/oauth/callback", get(auth::callback))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the favorites routes router.
pub fn favorites_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::index))
        .route("/toggle", post(favorites::toggle))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order_detail))
        .route("/notifications", get(account::notifications))
        .route(
            "/notifications/read-all",
            post(account::mark_all_notifications_read),
        )
        .route(
            "/notifications/{id}/read",
            post(account::mark_notification_read),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    let api_limit = api_rate_limiter();

    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .nest("/products", product_routes())
        // Cart + checkout (rate limited as a group)
        .nest("/cart", cart_routes().layer(api_limit.clone()))
        .route(
            "/checkout",
            get(checkout::show).post(checkout::place_order),
        )
        // Favorites
        .nest("/favorites", favorites_routes().layer(api_limit))
        // Account
        .nest("/account", account_routes())
        // Auth (stricter limits)
        .nest("/auth", auth_routes().layer(auth_rate_limiter()))
}
