//! Checkout route handlers: the cart -> order conversion.
//!
//! Placing an order runs as one database transaction (see
//! `db::orders::OrderRepository::create_from_cart`). The confirmation email
//! and the "order placed" notification happen after commit and are
//! best-effort: a failed send is logged, never unwound.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use verdant_core::PaymentMethod;

use crate::db::{CartRepository, NotificationRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, NewOrder};
use crate::routes::cart::CartView;
use crate::state::AppState;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub user: Option<CurrentUser>,
    pub cart: CartView,
    pub error: Option<String>,
}

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub payment_method: String,
    pub shipping_address: String,
    pub shipping_phone: String,
}

/// Checkout page handler.
///
/// An empty cart has nothing to check out; redirect back to the cart page.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let lines = CartRepository::new(state.pool()).lines(user.id).await?;

    if lines.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    Ok(CheckoutTemplate {
        user: Some(user),
        cart: CartView::from_lines(&lines),
        error: None,
    }
    .into_response())
}

/// Place the order.
#[instrument(skip(state, user, form))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let payment_method = PaymentMethod::from_str(&form.payment_method)
        .map_err(AppError::BadRequest)?;

    let shipping_address = form.shipping_address.trim().to_string();
    if shipping_address.is_empty() {
        return Err(AppError::BadRequest("shipping address is required".to_string()));
    }

    let shipping_phone = form.shipping_phone.trim().to_string();
    if shipping_phone.is_empty() {
        return Err(AppError::BadRequest("shipping phone is required".to_string()));
    }

    let input = NewOrder {
        payment_method,
        shipping_address,
        shipping_phone,
    };

    let (order, items) = OrderRepository::new(state.pool())
        .create_from_cart(user.id, &input)
        .await?;

    tracing::info!(
        order_number = %order.order_number,
        user_id = %user.id,
        total = %order.total_amount,
        "Order placed"
    );

    // Post-commit side effects: never fail the placed order.
    let message = format!("Order {} placed successfully.", order.order_number);
    if let Err(e) = NotificationRepository::new(state.pool())
        .create(user.id, &message)
        .await
    {
        tracing::error!(order_number = %order.order_number, "Failed to create notification: {e}");
    }

    if let Err(e) = state
        .mailer()
        .send_order_confirmation(user.email.as_str(), &user.name, &order, &items)
        .await
    {
        tracing::error!(order_number = %order.order_number, "Failed to send confirmation email: {e}");
    }

    Ok(Redirect::to(&format!("/account/orders/{}", order.id)).into_response())
}
