//! Domain models for the admin dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use verdant_core::{
    ActivityLogId, CategoryId, Email, Money, OrderId, OrderItemId, OrderStatus, PaymentMethod,
    ProductId, UserId, UserRole,
};

/// Keys used for typed session values.
pub mod session_keys {
    /// The signed-in admin (`CurrentAdmin`).
    pub const CURRENT_ADMIN: &str = "current_admin";
    /// CSRF state for the in-flight OAuth authorization request.
    pub const OAUTH_STATE: &str = "oauth_state";
}

/// The signed-in admin as stored in the session.
///
/// The role is re-checked against the users table on every admin request,
/// so demoting an admin takes effect immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: UserId,
    pub email: Email,
    pub name: String,
}

/// A product row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: i32,
    pub images: Vec<String>,
    pub category_id: Option<CategoryId>,
    pub likes: i32,
    pub ordered_count: i32,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A color option for a product.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProductColor {
    pub name: String,
    pub hex: String,
    pub image: Option<String>,
}

/// Input for creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: i32,
    pub images: Vec<String>,
    pub category_id: Option<CategoryId>,
    pub featured: bool,
    pub colors: Vec<ProductColor>,
}

/// A category row with its product count.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryWithCount {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub product_count: i64,
}

/// An order row joined with its customer and item count.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderWithCustomer {
    pub id: OrderId,
    pub user_id: UserId,
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub shipping_address: String,
    pub shipping_phone: String,
    pub total_amount: Money,
    pub resend_email_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub customer_email: Email,
    pub customer_name: String,
    pub item_count: i64,
}

/// A snapshot line on an order.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
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

/// A customer row with aggregate order data.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerRow {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub order_count: i64,
    pub total_spent: Option<Money>,
}

/// An admin audit-trail entry.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityLog {
    pub id: ActivityLogId,
    pub actor: String,
    pub action: String,
    pub subject: String,
    pub created_at: DateTime<Utc>,
}

/// Order counts and revenue for the dashboard.
#[derive(Debug, Clone, Default)]
pub struct DashboardStats {
    pub total_orders: i64,
    pub pending: i64,
    pub processing: i64,
    pub shipped: i64,
    pub delivered: i64,
    pub cancelled: i64,
    /// Revenue across non-cancelled orders.
    pub revenue: Money,
}

/// One flattened row of the orders CSV export.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderExportRow {
    pub id: OrderId,
    pub order_number: String,
    pub customer_email: Email,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub total_amount: Money,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}
