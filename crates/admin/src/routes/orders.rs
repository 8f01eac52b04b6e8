//! Order management route handlers.

use std::str::FromStr;

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use verdant_core::{OrderId, OrderStatus};

use crate::db::{ActivityLogRepository, OrderRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{OrderItem, OrderWithCustomer};
use crate::state::AppState;

use super::dashboard::{AdminUserView, render};

/// Orders per admin listing page.
const PER_PAGE: i64 = 25;

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

/// Order row for the listing template.
#[derive(Debug, Clone)]
pub struct OrderRowView {
    pub id: i32,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub status: String,
    pub status_class: String,
    pub total: String,
    pub item_count: i64,
    pub created_at: String,
}

impl From<&OrderWithCustomer> for OrderRowView {
    fn from(order: &OrderWithCustomer) -> Self {
        let (status, status_class) = status_display(order.status);
        Self {
            id: order.id.as_i32(),
            order_number: order.order_number.clone(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.to_string(),
            status: status.to_string(),
            status_class: status_class.to_string(),
            total: order.total_amount.display(),
            item_count: order.item_count,
            created_at: order.created_at.format("%b %e, %Y").to_string(),
        }
    }
}

/// Order line for the detail template.
#[derive(Debug, Clone)]
pub struct LineItemView {
    pub name: String,
    pub color: Option<String>,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&OrderItem> for LineItemView {
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

/// Status option for the detail form.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Order detail for templates.
#[derive(Debug, Clone)]
pub struct OrderDetailView {
    pub id: i32,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub status: String,
    pub status_class: String,
    pub payment_method: String,
    pub shipping_address: String,
    pub shipping_phone: String,
    pub total: String,
    pub resend_email_count: i32,
    pub created_at: String,
}

impl From<&OrderWithCustomer> for OrderDetailView {
    fn from(order: &OrderWithCustomer) -> Self {
        let (status, status_class) = status_display(order.status);
        Self {
            id: order.id.as_i32(),
            order_number: order.order_number.clone(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.to_string(),
            status: status.to_string(),
            status_class: status_class.to_string(),
            payment_method: order.payment_method.label().to_string(),
            shipping_address: order.shipping_address.clone(),
            shipping_phone: order.shipping_phone.clone(),
            total: order.total_amount.display(),
            resend_email_count: order.resend_email_count,
            created_at: order.created_at.format("%b %e, %Y at %H:%M UTC").to_string(),
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
}

/// Orders listing template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub orders: Vec<OrderRowView>,
    pub status_filter: Option<String>,
    pub statuses: Vec<StatusOption>,
    pub page: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Order detail template.
#[derive(Template)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub order: OrderDetailView,
    pub items: Vec<LineItemView>,
    pub statuses: Vec<StatusOption>,
    pub error: Option<String>,
}

/// Build the status `<select>` options, marking the current one.
fn status_options(current: Option<OrderStatus>) -> Vec<StatusOption> {
    OrderStatus::ALL
        .iter()
        .map(|status| StatusOption {
            value: status.to_string(),
            label: status.label().to_string(),
            selected: current == Some(*status),
        })
        .collect()
}

/// Orders listing page handler.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>> {
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(OrderStatus::from_str(raw).map_err(AppError::BadRequest)?),
        None => None,
    };

    let page = query.page.unwrap_or(1).max(1);
    let offset = i64::from(page - 1) * PER_PAGE;

    let repo = OrderRepository::new(state.pool());
    let orders = repo.list(status, PER_PAGE, offset).await?;
    let total = repo.count(status).await?;

    let template = OrdersIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/orders".to_string(),
        orders: orders.iter().map(OrderRowView::from).collect(),
        status_filter: query.status,
        statuses: status_options(status),
        page,
        has_prev: page > 1,
        has_next: offset + PER_PAGE < total,
    };

    Ok(render(template))
}

/// Order detail page handler.
#[instrument(skip(admin, state))]
pub async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>> {
    let (order, items) = OrderRepository::new(state.pool())
        .get(OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let template = OrderShowTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/orders".to_string(),
        order: OrderDetailView::from(&order),
        items: items.iter().map(LineItemView::from).collect(),
        statuses: status_options(Some(order.status)),
        error: None,
    };

    Ok(render(template))
}

/// Status update form input.
#[derive(Debug, Deserialize)]
pub struct StatusFormInput {
    pub status: String,
}

/// Update order status handler.
///
/// Emails the customer about the change; the email is best-effort and never
/// rolls back the status update.
#[instrument(skip(admin, state, input))]
pub async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(input): Form<StatusFormInput>,
) -> Result<Redirect> {
    let new_status = OrderStatus::from_str(&input.status).map_err(AppError::BadRequest)?;
    let order_id = OrderId::new(id);

    let repo = OrderRepository::new(state.pool());
    let (order, _) = repo
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    if order.status == new_status {
        return Ok(Redirect::to(&format!("/orders/{id}")));
    }

    if new_status == OrderStatus::Cancelled && !order.status.cancellable() {
        return Err(AppError::Conflict(format!(
            "order {} can no longer be cancelled",
            order.order_number
        )));
    }

    repo.update_status(order_id, new_status).await?;

    tracing::info!(
        order_number = %order.order_number,
        from = %order.status,
        to = %new_status,
        "Order status updated"
    );

    if let Err(e) = ActivityLogRepository::new(state.pool())
        .record(
            admin.email.as_str(),
            "updated order status",
            &format!("{} -> {new_status}", order.order_number),
        )
        .await
    {
        tracing::error!("Failed to record activity: {e}");
    }

    if let Err(e) = state.mailer().send_status_update(&order, new_status).await {
        tracing::error!(order_number = %order.order_number, "Failed to send status email: {e}");
    }

    Ok(Redirect::to(&format!("/orders/{id}")))
}

/// Re-send the order confirmation email.
///
/// The counter is incremented first (and enforces the cap); if the send then
/// fails, the attempt still counts.
#[instrument(skip(admin, state))]
pub async fn resend_email(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>> {
    let order_id = OrderId::new(id);
    let repo = OrderRepository::new(state.pool());

    let (order, items) = repo
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let error = match repo.increment_resend_count(order_id).await {
        Ok(count) => {
            if let Err(e) = state
                .mailer()
                .resend_order_confirmation(&order, &items)
                .await
            {
                tracing::error!(order_number = %order.order_number, "Failed to re-send confirmation: {e}");
                Some("Failed to send the email; the attempt was still counted.".to_string())
            } else {
                tracing::info!(
                    order_number = %order.order_number,
                    resend_count = count,
                    "Confirmation email re-sent"
                );
                if let Err(e) = ActivityLogRepository::new(state.pool())
                    .record(
                        admin.email.as_str(),
                        "re-sent confirmation email",
                        &order.order_number,
                    )
                    .await
                {
                    tracing::error!("Failed to record activity: {e}");
                }
                None
            }
        }
        Err(RepositoryError::Conflict(message)) => Some(message),
        Err(e) => return Err(e.into()),
    };

    // Re-fetch so the page shows the updated counter.
    let (order, items) = repo
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let template = OrderShowTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/orders".to_string(),
        order: OrderDetailView::from(&order),
        items: items.iter().map(LineItemView::from).collect(),
        statuses: status_options(Some(order.status)),
        error,
    };

    Ok(render(template))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_options_marks_current() {
        let options = status_options(Some(OrderStatus::Shipped));
        let shipped = options
            .iter()
            .find(|o| o.value == "shipped")
            .expect("shipped option present");
        assert!(shipped.selected);
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
    }

    #[test]
    fn test_status_display_classes() {
        assert_eq!(status_display(OrderStatus::Delivered).1, "bg-green-100 text-green-700");
        assert_eq!(status_display(OrderStatus::Cancelled).1, "bg-red-100 text-red-700");
    }
}
