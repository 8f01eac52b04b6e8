//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Cart lines live on the user row's join table, so every handler requires a
//! signed-in user.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use verdant_core::{Money, ProductId};

use crate::db::CartRepository;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CartLine, CurrentUser};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: i32,
    pub name: String,
    /// Empty string when no color was chosen.
    pub color_name: String,
    pub quantity: i32,
    pub price: String,
    pub line_price: String,
    pub image: Option<String>,
    pub stock: i32,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.as_i32(),
            name: line.name.clone(),
            color_name: line.color_name.clone(),
            quantity: line.quantity,
            price: line.price.display(),
            line_price: line.line_total().display(),
            image: line.image.clone(),
            stock: line.stock,
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: i64,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: Money::ZERO.display(),
            item_count: 0,
        }
    }

    /// Build the view from cart lines.
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        let subtotal: Money = lines.iter().map(CartLine::line_total).sum();
        let item_count = lines.iter().map(|l| i64::from(l.quantity)).sum();

        Self {
            items: lines.iter().map(CartItemView::from).collect(),
            subtotal: subtotal.display(),
            item_count,
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
    pub color_name: Option<String>,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: i32,
    pub color_name: Option<String>,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: i32,
    pub color_name: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub user: Option<CurrentUser>,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: i64,
}

/// Fetch the current cart view for a user, degrading to empty on error.
async fn load_cart(state: &AppState, user: &CurrentUser) -> CartView {
    match CartRepository::new(state.pool()).lines(user.id).await {
        Ok(lines) => CartView::from_lines(&lines),
        Err(e) => {
            tracing::error!("Failed to load cart for user {}: {e}", user.id);
            CartView::empty()
        }
    }
}

/// Display cart page.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    let cart = load_cart(&state, &user).await;

    CartShowTemplate {
        user: Some(user),
        cart,
    }
}

/// Add item to cart (HTMX).
///
/// Returns the cart count badge with an HTMX trigger so other fragments on
/// the page can refresh themselves.
#[instrument(skip(state, user))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let quantity = form.quantity.unwrap_or(1).max(1);
    let color_name = form.color_name.unwrap_or_default();
    let repo = CartRepository::new(state.pool());

    match repo
        .add(user.id, ProductId::new(form.product_id), &color_name, quantity)
        .await
    {
        Ok(()) => {
            let count = repo.count(user.id).await.unwrap_or(0);
            (
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                CartCountTemplate { count },
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to add item to cart: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<span class=\"text-red-500\">Error adding to cart</span>"),
            )
                .into_response()
        }
    }
}

/// Update cart line quantity (HTMX). Quantity zero removes the line.
#[instrument(skip(state, user))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let color_name = form.color_name.unwrap_or_default();
    let repo = CartRepository::new(state.pool());

    if let Err(e) = repo
        .set_quantity(
            user.id,
            ProductId::new(form.product_id),
            &color_name,
            form.quantity,
        )
        .await
    {
        tracing::error!("Failed to update cart: {e}");
    }

    let cart = load_cart(&state, &user).await;
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate { cart },
    )
        .into_response()
}

/// Remove line from cart (HTMX).
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let color_name = form.color_name.unwrap_or_default();
    let repo = CartRepository::new(state.pool());

    if let Err(e) = repo
        .remove(user.id, ProductId::new(form.product_id), &color_name)
        .await
    {
        tracing::error!("Failed to remove from cart: {e}");
    }

    let cart = load_cart(&state, &user).await;
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate { cart },
    )
        .into_response()
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, user))]
pub async fn count(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    let count = CartRepository::new(state.pool())
        .count(user.id)
        .await
        .unwrap_or(0);

    CartCountTemplate { count }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, price: &str, quantity: i32) -> CartLine {
        CartLine {
            product_id: ProductId::new(1),
            name: name.to_string(),
            price: Money::new(price.parse().expect("valid decimal")),
            color_name: String::new(),
            quantity,
            stock: 10,
            image: None,
        }
    }

    #[test]
    fn test_cart_view_empty() {
        let cart = CartView::empty();
        assert_eq!(cart.subtotal, "$0.00");
        assert_eq!(cart.item_count, 0);
        assert!(cart.items.is_empty());
    }

    #[test]
    fn test_cart_view_totals() {
        let lines = vec![line("Fern", "10.00", 2), line("Pothos", "7.50", 1)];
        let cart = CartView::from_lines(&lines);

        assert_eq!(cart.item_count, 3);
        assert_eq!(cart.subtotal, "$27.50");
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items.first().map(|i| i.line_price.as_str()), Some("$20.00"));
    }
}
