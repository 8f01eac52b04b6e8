//! Home page route handler.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::db::{CategoryRepository, ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::routes::products::{CategoryView, ProductCardView};
use crate::state::{AppState, CatalogSnapshot};

/// How many featured products the home page shows.
const FEATURED_LIMIT: i64 = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user: Option<CurrentUser>,
    pub featured: Vec<ProductCardView>,
    pub categories: Vec<CategoryView>,
}

/// Load the home-page catalog snapshot, via the short-TTL cache.
async fn catalog_snapshot(state: &AppState) -> Result<Arc<CatalogSnapshot>> {
    state
        .catalog_cache()
        .try_get_with("home", async {
            let featured = ProductRepository::new(state.pool())
                .featured(FEATURED_LIMIT)
                .await?;
            let categories = CategoryRepository::new(state.pool()).list().await?;
            Ok::<_, RepositoryError>(Arc::new(CatalogSnapshot {
                featured,
                categories,
            }))
        })
        .await
        .map_err(|e: Arc<RepositoryError>| AppError::Internal(e.to_string()))
}

/// Home page handler.
#[instrument(skip(state, user))]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<HomeTemplate> {
    let snapshot = catalog_snapshot(&state).await?;

    // The cached snapshot is shared across viewers, so favorite badges are
    // rendered unset on the home page; the catalog and product pages show
    // the per-user state.
    let featured = snapshot
        .featured
        .iter()
        .map(|p| ProductCardView::from_product(p, false))
        .collect();

    Ok(HomeTemplate {
        user,
        featured,
        categories: snapshot.categories.iter().map(CategoryView::from).collect(),
    })
}
