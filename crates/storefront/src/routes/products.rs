//! Product catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::instrument;

use verdant_core::{CategoryId, ProductId};

use crate::db::{CategoryRepository, FavoriteRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{Category, CurrentUser, Product, ProductColor};
use crate::services::markdown;
use crate::state::AppState;

/// Products per catalog page.
const PER_PAGE: i64 = 12;

/// Product card display data for grid templates.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub id: i32,
    pub name: String,
    pub price: String,
    pub image: Option<String>,
    pub likes: i32,
    pub in_stock: bool,
    pub favorited: bool,
}

impl ProductCardView {
    /// Build a card from a product row and the viewer's favorite state.
    #[must_use]
    pub fn from_product(product: &Product, favorited: bool) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            price: product.price.display(),
            image: product.cover_image().map(ToOwned::to_owned),
            likes: product.likes,
            in_stock: product.in_stock(),
            favorited,
        }
    }
}

/// Category display data for filter bars.
#[derive(Debug, Clone)]
pub struct CategoryView {
    pub id: i32,
    pub name: String,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.as_i32(),
            name: category.name.clone(),
        }
    }
}

/// Color swatch display data.
#[derive(Debug, Clone)]
pub struct ColorView {
    pub name: String,
    pub hex: String,
    pub image: Option<String>,
}

impl From<&ProductColor> for ColorView {
    fn from(color: &ProductColor) -> Self {
        Self {
            name: color.name.clone(),
            hex: color.hex.clone(),
            image: color.image.clone(),
        }
    }
}

/// Product detail display data.
pub struct ProductDetailView {
    pub id: i32,
    pub name: String,
    /// Rendered from the Markdown source.
    pub description_html: String,
    pub price: String,
    pub stock: i32,
    pub in_stock: bool,
    pub images: Vec<String>,
    pub likes: i32,
    pub ordered_count: i32,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            description_html: markdown::render(&product.description),
            price: product.price.display(),
            stock: product.stock,
            in_stock: product.in_stock(),
            images: product.images.clone(),
            likes: product.likes,
            ordered_count: product.ordered_count,
        }
    }
}

/// Catalog listing query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<i32>,
    pub page: Option<u32>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub user: Option<CurrentUser>,
    pub products: Vec<ProductCardView>,
    pub categories: Vec<CategoryView>,
    pub current_category: Option<i32>,
    pub page: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub user: Option<CurrentUser>,
    pub product: ProductDetailView,
    pub colors: Vec<ColorView>,
    pub favorited: bool,
}

/// Look up which of the given products the viewer has favorited.
async fn favorite_flags(
    state: &AppState,
    user: Option<&CurrentUser>,
    products: &[Product],
) -> Result<Vec<bool>> {
    let Some(user) = user else {
        return Ok(vec![false; products.len()]);
    };

    let ids = FavoriteRepository::new(state.pool())
        .ids_for_user(user.id)
        .await?;

    Ok(products.iter().map(|p| ids.contains(&p.id)).collect())
}

/// Product listing page handler.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<CatalogQuery>,
) -> Result<ProductsIndexTemplate> {
    let category = query.category.map(CategoryId::new);
    let page = query.page.unwrap_or(1).max(1);
    let offset = i64::from(page - 1) * PER_PAGE;

    let products_repo = ProductRepository::new(state.pool());
    let products = products_repo.list(category, PER_PAGE, offset).await?;
    let total = products_repo.count(category).await?;
    let categories = CategoryRepository::new(state.pool()).list().await?;

    let flags = favorite_flags(&state, user.as_ref(), &products).await?;
    let cards = products
        .iter()
        .zip(flags)
        .map(|(p, favorited)| ProductCardView::from_product(p, favorited))
        .collect();

    Ok(ProductsIndexTemplate {
        user,
        products: cards,
        categories: categories.iter().map(CategoryView::from).collect(),
        current_category: query.category,
        page,
        has_prev: page > 1,
        has_next: offset + PER_PAGE < total,
    })
}

/// Product detail page handler.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<i32>,
) -> Result<ProductShowTemplate> {
    let product_id = ProductId::new(id);
    let products_repo = ProductRepository::new(state.pool());

    let product = products_repo
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let colors = products_repo.colors(product_id).await?;

    let favorited = match &user {
        Some(user) => {
            FavoriteRepository::new(state.pool())
                .is_favorite(user.id, product_id)
                .await?
        }
        None => false,
    };

    Ok(ProductShowTemplate {
        user,
        product: ProductDetailView::from(&product),
        colors: colors.iter().map(ColorView::from).collect(),
        favorited,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use verdant_core::Money;

    fn sample_product() -> Product {
        Product {
            id: ProductId::new(7),
            name: "Monstera Deliciosa".to_string(),
            description: "# Big leaves".to_string(),
            price: Money::new("34.00".parse().expect("valid decimal")),
            stock: 0,
            images: vec!["https://img.example.com/a.jpg".to_string()],
            category_id: None,
            likes: 12,
            ordered_count: 90,
            featured: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_product_card_view() {
        let card = ProductCardView::from_product(&sample_product(), true);
        assert_eq!(card.id, 7);
        assert_eq!(card.price, "$34.00");
        assert_eq!(card.image.as_deref(), Some("https://img.example.com/a.jpg"));
        assert!(card.favorited);
        assert!(!card.in_stock);
    }

    #[test]
    fn test_product_detail_renders_markdown() {
        let detail = ProductDetailView::from(&sample_product());
        assert!(detail.description_html.contains("<h1>Big leaves</h1>"));
    }
}
