//! Product management route handlers.

use std::str::FromStr;

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use verdant_core::{CategoryId, Money, ProductId};

use crate::db::{ActivityLogRepository, CategoryRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{CurrentAdmin, Product, ProductColor, ProductInput};
use crate::state::AppState;

use super::dashboard::{AdminUserView, render};

/// Products per admin listing page.
const PER_PAGE: i64 = 25;

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub query: Option<String>,
    pub page: Option<u32>,
}

/// Product row for the listing template.
#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub id: i32,
    pub name: String,
    pub price: String,
    pub stock: i32,
    pub likes: i32,
    pub ordered_count: i32,
    pub featured: bool,
}

impl From<&Product> for ProductRowView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            price: product.price.display(),
            stock: product.stock,
            likes: product.likes,
            ordered_count: product.ordered_count,
            featured: product.featured,
        }
    }
}

/// Category option for the product form.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub id: i32,
    pub name: String,
    pub selected: bool,
}

/// Pre-filled form values for the product form template.
#[derive(Debug, Clone, Default)]
pub struct ProductFormView {
    pub id: Option<i32>,
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: i32,
    /// One image URL per line.
    pub images: String,
    /// One `name,hex[,image]` color per line.
    pub colors: String,
    pub featured: bool,
}

/// Product listing template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub products: Vec<ProductRowView>,
    pub search_query: Option<String>,
    pub page: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Product create/edit form template.
#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub form: ProductFormView,
    pub categories: Vec<CategoryOption>,
    pub error: Option<String>,
}

/// Product form input.
#[derive(Debug, Deserialize)]
pub struct ProductFormInput {
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: i32,
    pub images: String,
    pub colors: String,
    pub category_id: Option<String>,
    pub featured: Option<String>,
}

/// Parse one image URL per non-empty line.
fn parse_images(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Parse one `name,hex[,image]` color per non-empty line.
fn parse_colors(input: &str) -> std::result::Result<Vec<ProductColor>, String> {
    let mut colors = Vec::new();

    for line in input.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let mut parts = line.splitn(3, ',').map(str::trim);
        let name = parts.next().unwrap_or_default();
        let hex = parts.next().unwrap_or_default();

        if name.is_empty() || hex.is_empty() {
            return Err(format!("color line '{line}' must be name,hex[,image]"));
        }
        if !hex.starts_with('#') {
            return Err(format!("color '{name}' has a hex value without '#'"));
        }

        colors.push(ProductColor {
            name: name.to_owned(),
            hex: hex.to_owned(),
            image: parts.next().filter(|s| !s.is_empty()).map(ToOwned::to_owned),
        });
    }

    Ok(colors)
}

/// Convert the raw form into a repository input.
fn parse_form(input: &ProductFormInput) -> std::result::Result<ProductInput, String> {
    let name = input.name.trim().to_owned();
    if name.is_empty() {
        return Err("name is required".to_owned());
    }

    let price = Decimal::from_str(input.price.trim())
        .map_err(|_| format!("invalid price '{}'", input.price))?;
    if price.is_sign_negative() {
        return Err("price cannot be negative".to_owned());
    }

    if input.stock < 0 {
        return Err("stock cannot be negative".to_owned());
    }

    let category_id = match input.category_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<i32>()
                .map(CategoryId::new)
                .map_err(|_| format!("invalid category '{raw}'"))?,
        ),
    };

    Ok(ProductInput {
        name,
        description: input.description.trim().to_owned(),
        price: Money::new(price),
        stock: input.stock,
        images: parse_images(&input.images),
        category_id,
        featured: input.featured.as_deref() == Some("on"),
        colors: parse_colors(&input.colors)?,
    })
}

/// Load category options for the form, marking the selected one.
async fn category_options(
    state: &AppState,
    selected: Option<CategoryId>,
) -> Result<Vec<CategoryOption>> {
    let categories = CategoryRepository::new(state.pool())
        .list_with_counts()
        .await?;

    Ok(categories
        .iter()
        .map(|c| CategoryOption {
            id: c.id.as_i32(),
            name: c.name.clone(),
            selected: selected == Some(c.id),
        })
        .collect())
}

/// Format stored colors back into the form's line syntax.
fn colors_to_lines(colors: &[ProductColor]) -> String {
    colors
        .iter()
        .map(|c| match &c.image {
            Some(image) => format!("{},{},{}", c.name, c.hex, image),
            None => format!("{},{}", c.name, c.hex),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Product listing page handler.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>> {
    let page = query.page.unwrap_or(1).max(1);
    let offset = i64::from(page - 1) * PER_PAGE;
    let search = query.query.as_deref().filter(|q| !q.trim().is_empty());

    let repo = ProductRepository::new(state.pool());
    let products = repo.list(search, PER_PAGE, offset).await?;
    let total = repo.count(search).await?;

    let template = ProductsIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/products".to_string(),
        products: products.iter().map(ProductRowView::from).collect(),
        search_query: query.query,
        page,
        has_prev: page > 1,
        has_next: offset + PER_PAGE < total,
    };

    Ok(render(template))
}

/// New product form handler.
#[instrument(skip(admin, state))]
pub async fn new(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let template = ProductFormTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/products".to_string(),
        form: ProductFormView::default(),
        categories: category_options(&state, None).await?,
        error: None,
    };

    Ok(render(template))
}

/// Create product handler.
#[instrument(skip(admin, state, input))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Form(input): Form<ProductFormInput>,
) -> Result<Response> {
    let parsed = match parse_form(&input) {
        Ok(parsed) => parsed,
        Err(message) => {
            let template = ProductFormTemplate {
                admin_user: AdminUserView::from(&admin),
                current_path: "/products".to_string(),
                form: form_view_from_input(None, &input),
                categories: category_options(&state, None).await?,
                error: Some(message),
            };
            return Ok(render(template).into_response());
        }
    };

    let product = ProductRepository::new(state.pool()).create(&parsed).await?;

    log_activity(&state, &admin, "created product", &product.name).await;
    tracing::info!(product_id = %product.id, "Product created");

    Ok(Redirect::to("/products").into_response())
}

/// Edit product form handler.
#[instrument(skip(admin, state))]
pub async fn edit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>> {
    let product_id = ProductId::new(id);
    let repo = ProductRepository::new(state.pool());

    let product = repo
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    let colors = repo.colors(product_id).await?;

    let form = ProductFormView {
        id: Some(id),
        name: product.name.clone(),
        description: product.description.clone(),
        price: product.price.amount().to_string(),
        stock: product.stock,
        images: product.images.join("\n"),
        colors: colors_to_lines(&colors),
        featured: product.featured,
    };

    let template = ProductFormTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/products".to_string(),
        form,
        categories: category_options(&state, product.category_id).await?,
        error: None,
    };

    Ok(render(template))
}

/// Update product handler.
#[instrument(skip(admin, state, input))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(input): Form<ProductFormInput>,
) -> Result<Response> {
    let parsed = match parse_form(&input) {
        Ok(parsed) => parsed,
        Err(message) => {
            let template = ProductFormTemplate {
                admin_user: AdminUserView::from(&admin),
                current_path: "/products".to_string(),
                form: form_view_from_input(Some(id), &input),
                categories: category_options(&state, None).await?,
                error: Some(message),
            };
            return Ok(render(template).into_response());
        }
    };

    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), &parsed)
        .await?;

    log_activity(&state, &admin, "updated product", &product.name).await;

    Ok(Redirect::to("/products").into_response())
}

/// Delete product handler.
#[instrument(skip(admin, state))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Redirect> {
    let deleted = ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await?;

    if deleted {
        log_activity(&state, &admin, "deleted product", &format!("#{id}")).await;
    }

    Ok(Redirect::to("/products"))
}

/// Stock adjustment form input.
#[derive(Debug, Deserialize)]
pub struct StockAdjustInput {
    pub delta: i32,
}

/// Adjust stock handler.
#[instrument(skip(admin, state))]
pub async fn adjust_stock(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(input): Form<StockAdjustInput>,
) -> Result<Redirect> {
    let stock = ProductRepository::new(state.pool())
        .adjust_stock(ProductId::new(id), input.delta)
        .await?;

    log_activity(
        &state,
        &admin,
        "adjusted stock",
        &format!("#{id} to {stock}"),
    )
    .await;

    Ok(Redirect::to("/products"))
}

/// Echo submitted values back into the form after a validation error.
fn form_view_from_input(id: Option<i32>, input: &ProductFormInput) -> ProductFormView {
    ProductFormView {
        id,
        name: input.name.clone(),
        description: input.description.clone(),
        price: input.price.clone(),
        stock: input.stock,
        images: input.images.clone(),
        colors: input.colors.clone(),
        featured: input.featured.as_deref() == Some("on"),
    }
}

/// Best-effort audit-trail write.
async fn log_activity(state: &AppState, admin: &CurrentAdmin, action: &str, subject: &str) {
    if let Err(e) = ActivityLogRepository::new(state.pool())
        .record(admin.email.as_str(), action, subject)
        .await
    {
        tracing::error!("Failed to record activity: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_images_skips_blank_lines() {
        let images = parse_images("https://a.jpg\n\n  https://b.jpg  \n");
        assert_eq!(images, vec!["https://a.jpg", "https://b.jpg"]);
    }

    #[test]
    fn test_parse_colors() {
        let colors = parse_colors("Terracotta,#c8553d\nSage,#9caf88,https://img/sage.jpg")
            .expect("valid colors");
        assert_eq!(colors.len(), 2);
        assert_eq!(colors.first().map(|c| c.hex.as_str()), Some("#c8553d"));
        assert_eq!(
            colors.get(1).and_then(|c| c.image.as_deref()),
            Some("https://img/sage.jpg")
        );
    }

    #[test]
    fn test_parse_colors_rejects_missing_hex() {
        assert!(parse_colors("JustAName").is_err());
        assert!(parse_colors("Name,c8553d").is_err());
    }

    #[test]
    fn test_parse_form_rejects_bad_price() {
        let input = ProductFormInput {
            name: "Fern".to_string(),
            description: String::new(),
            price: "abc".to_string(),
            stock: 1,
            images: String::new(),
            colors: String::new(),
            category_id: None,
            featured: None,
        };
        assert!(parse_form(&input).is_err());
    }

    #[test]
    fn test_parse_form_valid() {
        let input = ProductFormInput {
            name: " Fern ".to_string(),
            description: "Lush".to_string(),
            price: "12.50".to_string(),
            stock: 4,
            images: "https://a.jpg".to_string(),
            colors: "Green,#00ff00".to_string(),
            category_id: Some("3".to_string()),
            featured: Some("on".to_string()),
        };

        let parsed = parse_form(&input).expect("valid form");
        assert_eq!(parsed.name, "Fern");
        assert_eq!(parsed.price.display(), "$12.50");
        assert_eq!(parsed.category_id, Some(CategoryId::new(3)));
        assert!(parsed.featured);
        assert_eq!(parsed.colors.len(), 1);
    }

    #[test]
    fn test_colors_to_lines_roundtrip() {
        let colors = vec![
            ProductColor {
                name: "Sage".to_string(),
                hex: "#9caf88".to_string(),
                image: None,
            },
            ProductColor {
                name: "Clay".to_string(),
                hex: "#c8553d".to_string(),
                image: Some("https://img/clay.jpg".to_string()),
            },
        ];

        let lines = colors_to_lines(&colors);
        let parsed = parse_colors(&lines).expect("roundtrip parses");
        assert_eq!(parsed, colors);
    }
}
