//! Order domain types.
//!
//! `OrderItem` is a denormalized snapshot of the product at purchase time.
//! It intentionally does not join back to live product rows, so historical
//! orders remain stable if products change or disappear later.

use chrono::{DateTime, Utc};

use verdant_core::{Money, OrderId, OrderItemId, OrderStatus, PaymentMethod, ProductId, UserId};

/// An order row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    /// Human-facing order number, e.g. `VD-20260715-8FK2QD`.
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub shipping_address: String,
    pub shipping_phone: String,
    pub total_amount: Money,
    pub resend_email_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A snapshot line on an order.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    /// Reference to the live product; NULL once the product is deleted.
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub product_price: Money,
    pub color_name: Option<String>,
    pub quantity: i32,
}

impl OrderItem {
    /// Line total at the snapshotted price.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.product_price
            .times(u32::try_from(self.quantity).unwrap_or(0))
    }
}

/// Checkout input for creating an order from the cart.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub payment_method: PaymentMethod,
    pub shipping_address: String,
    pub shipping_phone: String,
}
