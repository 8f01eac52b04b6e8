//! Account route handlers: overview, order history, notifications.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::Redirect,
};
use tracing::instrument;

use verdant_core::{NotificationId, OrderId, OrderStatus};

use crate::db::{NotificationRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Notification, Order, OrderItem};
use crate::state::AppState;

/// Notifications shown per page.
const NOTIFICATIONS_LIMIT: i64 = 50;

/// Map an order status to display label and badge CSS class.
fn status_display(status: OrderStatus) -> (&'static str, &'static str) {
    match status {
        OrderStatus::Pending => ("Pending", "bg-yellow-100 text-yellow-700"),
        OrderStatus::Processing => ("Processing", "bg-blue-100 text-blue-700"),
        OrderStatus::Shipped => ("Shipped", "bg-indigo-100 text-indigo-700"),
        OrderStatus::Delivered => ("Delivered", "bg-green-100 text-green-700"),
        OrderStatus::Cancelled => ("Cancelled", "bg-red-100 text-red-700"),
    }
}

/// Order row display data for list templates.
#[derive(Debug, Clone)]
pub struct OrderRowView {
    pub id: i32,
    pub order_number: String,
    pub status: String,
    pub status_class: String,
    pub total: String,
    pub created_at: String,
}

impl From<&Order> for OrderRowView {
    fn from(order: &Order) -> Self {
        let (status, status_class) = status_display(order.status);
        Self {
            id: order.id.as_i32(),
            order_number: order.order_number.clone(),
            status: status.to_string(),
            status_class: status_class.to_string(),
            total: order.total_amount.display(),
            created_at: order.created_at.format("%B %e, %Y").to_string(),
        }
    }
}

/// Order line display data for the detail template.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub name: String,
    pub color: Option<String>,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            name: item.product_name.clone(),
            color: item.color_name.clone(),
            quantity: item.quantity,
            unit_price: item.product_price.display(),
            line_total: item.line_total().display(),
        }
    }
}

/// Order detail display data.
#[derive(Debug, Clone)]
pub struct OrderDetailView {
    pub order_number: String,
    pub status: String,
    pub status_class: String,
    pub payment_method: String,
    pub shipping_address: String,
    pub shipping_phone: String,
    pub total: String,
    pub created_at: String,
}

impl From<&Order> for OrderDetailView {
    fn from(order: &Order) -> Self {
        let (status, status_class) = status_display(order.status);
        Self {
            order_number: order.order_number.clone(),
            status: status.to_string(),
            status_class: status_class.to_string(),
            payment_method: order.payment_method.label().to_string(),
            shipping_address: order.shipping_address.clone(),
            shipping_phone: order.shipping_phone.clone(),
            total: order.total_amount.display(),
            created_at: order.created_at.format("%B %e, %Y at %H:%M UTC").to_string(),
        }
    }
}

/// Notification display data.
#[derive(Debug, Clone)]
pub struct NotificationView {
    pub id: i32,
    pub message: String,
    pub read: bool,
    pub created_at: String,
}

impl From<&Notification> for NotificationView {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id.as_i32(),
            message: notification.message.clone(),
            read: notification.read,
            created_at: notification.created_at.format("%B %e, %Y").to_string(),
        }
    }
}

/// Account overview template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub user: Option<CurrentUser>,
    pub recent_orders: Vec<OrderRowView>,
    pub unread_notifications: i64,
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub user: Option<CurrentUser>,
    pub orders: Vec<OrderRowView>,
}

/// Order detail template (also the post-checkout confirmation page).
#[derive(Template, WebTemplate)]
#[template(path = "account/order_detail.html")]
pub struct OrderDetailTemplate {
    pub user: Option<CurrentUser>,
    pub order: OrderDetailView,
    pub items: Vec<OrderItemView>,
}

/// Notifications template.
#[derive(Template, WebTemplate)]
#[template(path = "account/notifications.html")]
pub struct NotificationsTemplate {
    pub user: Option<CurrentUser>,
    pub notifications: Vec<NotificationView>,
    pub unread: i64,
}

/// Account overview handler.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<AccountTemplate> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    let unread = NotificationRepository::new(state.pool())
        .unread_count(user.id)
        .await?;

    let recent_orders = orders.iter().take(5).map(OrderRowView::from).collect();

    Ok(AccountTemplate {
        user: Some(user),
        recent_orders,
        unread_notifications: unread,
    })
}

/// Order history handler.
#[instrument(skip(state, user))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<OrdersTemplate> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(OrdersTemplate {
        user: Some(user),
        orders: orders.iter().map(OrderRowView::from).collect(),
    })
}

/// Order detail handler.
#[instrument(skip(state, user))]
pub async fn order_detail(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<OrderDetailTemplate> {
    let (order, items) = OrderRepository::new(state.pool())
        .get_for_user(user.id, OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(OrderDetailTemplate {
        user: Some(user),
        order: OrderDetailView::from(&order),
        items: items.iter().map(OrderItemView::from).collect(),
    })
}

/// Notifications feed handler.
#[instrument(skip(state, user))]
pub async fn notifications(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<NotificationsTemplate> {
    let repo = NotificationRepository::new(state.pool());
    let notifications = repo.list(user.id, NOTIFICATIONS_LIMIT).await?;
    let unread = repo.unread_count(user.id).await?;

    Ok(NotificationsTemplate {
        user: Some(user),
        notifications: notifications.iter().map(NotificationView::from).collect(),
        unread,
    })
}

/// Mark a single notification as read.
#[instrument(skip(state, user))]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Redirect> {
    NotificationRepository::new(state.pool())
        .mark_read(user.id, NotificationId::new(id))
        .await?;

    Ok(Redirect::to("/account/notifications"))
}

/// Mark all notifications as read.
#[instrument(skip(state, user))]
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Redirect> {
    NotificationRepository::new(state.pool())
        .mark_all_read(user.id)
        .await?;

    Ok(Redirect::to("/account/notifications"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_covers_all() {
        for status in OrderStatus::ALL {
            let (label, class) = status_display(status);
            assert!(!label.is_empty());
            assert!(class.starts_with("bg-"));
        }
    }

    #[test]
    fn test_status_display_labels() {
        assert_eq!(status_display(OrderStatus::Pending).0, "Pending");
        assert_eq!(status_display(OrderStatus::Cancelled).0, "Cancelled");
    }
}
