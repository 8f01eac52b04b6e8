//! Category management route handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use verdant_core::CategoryId;

use crate::db::{ActivityLogRepository, CategoryRepository, RepositoryError};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::CategoryWithCount;
use crate::state::AppState;

use super::dashboard::{AdminUserView, render};

/// Category row for the listing template.
#[derive(Debug, Clone)]
pub struct CategoryRowView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub product_count: i64,
}

impl From<&CategoryWithCount> for CategoryRowView {
    fn from(category: &CategoryWithCount) -> Self {
        Self {
            id: category.id.as_i32(),
            name: category.name.clone(),
            description: category.description.clone(),
            product_count: category.product_count,
        }
    }
}

/// Category listing template (with inline create form).
#[derive(Template)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub categories: Vec<CategoryRowView>,
    pub error: Option<String>,
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub error: Option<String>,
}

/// Category form input.
#[derive(Debug, Deserialize)]
pub struct CategoryFormInput {
    pub name: String,
    pub description: Option<String>,
}

/// Category listing page handler.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>> {
    let categories = CategoryRepository::new(state.pool())
        .list_with_counts()
        .await?;

    let template = CategoriesIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/categories".to_string(),
        categories: categories.iter().map(CategoryRowView::from).collect(),
        error: query.error,
    };

    Ok(render(template))
}

/// Create category handler.
#[instrument(skip(admin, state, input))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Form(input): Form<CategoryFormInput>,
) -> Result<Redirect> {
    let name = input.name.trim();
    if name.is_empty() {
        return Ok(Redirect::to("/categories?error=Name+is+required"));
    }

    let description = input.description.unwrap_or_default();
    match CategoryRepository::new(state.pool())
        .create(name, description.trim())
        .await
    {
        Ok(_) => {
            record_activity(&state, admin.email.as_str(), "created category", name).await;
            Ok(Redirect::to("/categories"))
        }
        Err(RepositoryError::Conflict(_)) => {
            Ok(Redirect::to("/categories?error=Category+name+already+exists"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Update category handler.
#[instrument(skip(admin, state, input))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(input): Form<CategoryFormInput>,
) -> Result<Redirect> {
    let name = input.name.trim();
    if name.is_empty() {
        return Ok(Redirect::to("/categories?error=Name+is+required"));
    }

    let description = input.description.unwrap_or_default();
    match CategoryRepository::new(state.pool())
        .update(CategoryId::new(id), name, description.trim())
        .await
    {
        Ok(()) => {
            record_activity(&state, admin.email.as_str(), "updated category", name).await;
            Ok(Redirect::to("/categories"))
        }
        Err(RepositoryError::Conflict(_)) => {
            Ok(Redirect::to("/categories?error=Category+name+already+exists"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete category handler.
///
/// Deleting a category that still has products is rejected; the listing page
/// shows the error.
#[instrument(skip(admin, state))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Redirect> {
    match CategoryRepository::new(state.pool())
        .delete(CategoryId::new(id))
        .await
    {
        Ok(true) => {
            record_activity(&state, admin.email.as_str(), "deleted category", &format!("#{id}"))
                .await;
            Ok(Redirect::to("/categories"))
        }
        Ok(false) => Ok(Redirect::to("/categories")),
        Err(RepositoryError::Conflict(_)) => Ok(Redirect::to(
            "/categories?error=Category+still+has+products",
        )),
        Err(e) => Err(e.into()),
    }
}

/// Best-effort audit-trail write.
async fn record_activity(state: &AppState, actor: &str, action: &str, subject: &str) {
    if let Err(e) = ActivityLogRepository::new(state.pool())
        .record(actor, action, subject)
        .await
    {
        tracing::error!("Failed to record activity: {e}");
    }
}
