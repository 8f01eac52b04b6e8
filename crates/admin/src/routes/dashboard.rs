//! Dashboard route handler.

use askama::Template;
use axum::{extract::State, response::Html};
use tracing::instrument;

use crate::db::{ActivityLogRepository, OrderRepository, ProductRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{ActivityLog, CurrentAdmin, DashboardStats, Product};
use crate::state::AppState;

/// Stock level at or below which a product shows on the dashboard.
const LOW_STOCK_THRESHOLD: i32 = 5;
const LOW_STOCK_LIMIT: i64 = 8;
const ACTIVITY_LIMIT: i64 = 15;

/// Admin identity for the page chrome.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.to_string(),
        }
    }
}

/// Dashboard stats for templates.
#[derive(Debug, Clone)]
pub struct StatsView {
    pub total_orders: i64,
    pub pending: i64,
    pub processing: i64,
    pub shipped: i64,
    pub delivered: i64,
    pub cancelled: i64,
    pub revenue: String,
}

impl From<&DashboardStats> for StatsView {
    fn from(stats: &DashboardStats) -> Self {
        Self {
            total_orders: stats.total_orders,
            pending: stats.pending,
            processing: stats.processing,
            shipped: stats.shipped,
            delivered: stats.delivered,
            cancelled: stats.cancelled,
            revenue: stats.revenue.display(),
        }
    }
}

/// Low-stock row for templates.
#[derive(Debug, Clone)]
pub struct LowStockView {
    pub id: i32,
    pub name: String,
    pub stock: i32,
}

impl From<&Product> for LowStockView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            stock: product.stock,
        }
    }
}

/// Activity row for templates.
#[derive(Debug, Clone)]
pub struct ActivityView {
    pub actor: String,
    pub action: String,
    pub subject: String,
    pub when: String,
}

impl From<&ActivityLog> for ActivityView {
    fn from(entry: &ActivityLog) -> Self {
        Self {
            actor: entry.actor.clone(),
            action: entry.action.clone(),
            subject: entry.subject.clone(),
            when: entry.created_at.format("%b %e, %H:%M").to_string(),
        }
    }
}

/// Dashboard page template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub stats: StatsView,
    pub low_stock: Vec<LowStockView>,
    pub activity: Vec<ActivityView>,
}

/// Render a template, degrading to a 500 body on render failure.
pub fn render(template: impl Template) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Dashboard page handler.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let stats = OrderRepository::new(state.pool()).stats().await?;
    let low_stock = ProductRepository::new(state.pool())
        .low_stock(LOW_STOCK_THRESHOLD, LOW_STOCK_LIMIT)
        .await?;
    let activity = ActivityLogRepository::new(state.pool())
        .recent(ACTIVITY_LIMIT)
        .await?;

    let template = DashboardTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/".to_string(),
        stats: StatsView::from(&stats),
        low_stock: low_stock.iter().map(LowStockView::from).collect(),
        activity: activity.iter().map(ActivityView::from).collect(),
    };

    Ok(render(template))
}
