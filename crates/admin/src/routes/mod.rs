//! HTTP route handlers for the admin dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Health check
//! GET  /                           - Dashboard overview
//!
//! # Auth (OAuth; requires role = admin on the user row)
//! GET  /login                      - Login page
//! GET  /auth/oauth/login           - Redirect to identity provider
//! GET  /auth/oauth/callback        - Handle OAuth callback
//! POST /logout                     - Logout
//!
//! # Products
//! GET  /products                   - Product listing (search, pagination)
//! GET  /products/new               - New product form
//! POST /products                   - Create product
//! GET  /products/{id}/edit         - Edit product form
//! POST /products/{id}              - Update product
//! POST /products/{id}/delete       - Delete product
//! POST /products/{id}/stock        - Adjust stock by a signed delta
//!
//! # Categories
//! GET  /categories                 - Category listing + create form
//! POST /categories                 - Create category
//! POST /categories/{id}            - Update category
//! POST /categories/{id}/delete     - Delete category (rejected if in use)
//!
//! # Orders
//! GET  /orders                     - Order listing (status filter, pagination)
//! GET  /orders/export.csv          - CSV export of all orders
//! GET  /orders/{id}                - Order detail
//! POST /orders/{id}/status         - Update status (emails the customer)
//! POST /orders/{id}/resend-email   - Re-send confirmation email (capped)
//!
//! # Customers
//! GET  /customers                  - Customer listing
//! ```

pub mod auth;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod export;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the admin dashboard.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Dashboard
        .route("/", get(dashboard::index))
        // Auth
        .route("/login", get(auth::login_page))
        .route("/auth/oauth/login", get(auth::login))
        .route("/auth/oauth/callback", get(auth::callback))
        .route("/logout", post(auth::logout))
        // Products
        .route("/products", get(products::index).post(products::create))
        .route("/products/new", get(products::new))
        .route("/products/{id}/edit", get(products::edit))
        .route("/products/{id}", post(products::update))
        .route("/products/{id}/delete", post(products::delete))
        .route("/products/{id}/stock", post(products::adjust_stock))
        // Categories
        .route(
            "/categories",
            get(categories::index).post(categories::create),
        )
        .route("/categories/{id}", post(categories::update))
        .route("/categories/{id}/delete", post(categories::delete))
        // Orders
        .route("/orders", get(orders::index))
        .route("/orders/export.csv", get(export::orders_csv))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/orders/{id}/resend-email", post(orders::resend_email))
        // Customers
        .route("/customers", get(customers::index))
}
