//! Customer listing route handler.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;
use tracing::instrument;

use verdant_core::{Money, UserRole};

use crate::db::CustomerRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::CustomerRow;
use crate::state::AppState;

use super::dashboard::{AdminUserView, render};

/// Customers per admin listing page.
const PER_PAGE: i64 = 50;

/// Customer row for the listing template.
#[derive(Debug, Clone)]
pub struct CustomerView {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
    pub order_count: i64,
    pub total_spent: String,
    pub joined: String,
}

impl From<&CustomerRow> for CustomerView {
    fn from(customer: &CustomerRow) -> Self {
        Self {
            id: customer.id.as_i32(),
            email: customer.email.to_string(),
            name: customer.name.clone(),
            is_admin: customer.role == UserRole::Admin,
            order_count: customer.order_count,
            total_spent: customer.total_spent.unwrap_or(Money::ZERO).display(),
            joined: customer.created_at.format("%b %e, %Y").to_string(),
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
}

/// Customers listing template.
#[derive(Template)]
#[template(path = "customers/index.html")]
pub struct CustomersIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub customers: Vec<CustomerView>,
    pub page: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Customers listing page handler.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>> {
    let page = query.page.unwrap_or(1).max(1);
    let offset = i64::from(page - 1) * PER_PAGE;

    let repo = CustomerRepository::new(state.pool());
    let customers = repo.list(PER_PAGE, offset).await?;
    let total = repo.count().await?;

    let template = CustomersIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/customers".to_string(),
        customers: customers.iter().map(CustomerView::from).collect(),
        page,
        has_prev: page > 1,
        has_next: offset + PER_PAGE < total,
    };

    Ok(render(template))
}
