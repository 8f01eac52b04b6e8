//! Favorites route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use verdant_core::ProductId;

use crate::db::{FavoriteRepository, RepositoryError};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// Favorites page template.
#[derive(Template, WebTemplate)]
#[template(path = "favorites/index.html")]
pub struct FavoritesTemplate {
    pub user: Option<CurrentUser>,
    pub products: Vec<ProductCardView>,
}

/// Favorite button fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/favorite_button.html")]
pub struct FavoriteButtonTemplate {
    pub product_id: i32,
    pub favorited: bool,
    pub likes: i32,
}

/// Toggle favorite form data.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub product_id: i32,
    /// Current like count, echoed back so a failed toggle can re-render the
    /// button unchanged.
    pub likes: Option<i32>,
}

/// Favorites page handler.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<FavoritesTemplate> {
    let products = FavoriteRepository::new(state.pool()).list(user.id).await?;

    // Everything on this page is favorited by construction.
    let cards = products
        .iter()
        .map(|p| ProductCardView::from_product(p, true))
        .collect();

    Ok(FavoritesTemplate {
        user: Some(user),
        products: cards,
    })
}

/// Toggle a favorite (HTMX).
///
/// Returns the updated button fragment with the new like count.
#[instrument(skip(state, user))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ToggleForm>,
) -> Response {
    let product_id = ProductId::new(form.product_id);

    match FavoriteRepository::new(state.pool())
        .toggle(user.id, product_id)
        .await
    {
        Ok((favorited, likes)) => FavoriteButtonTemplate {
            product_id: form.product_id,
            favorited,
            likes,
        }
        .into_response(),
        Err(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, Html("Product not found")).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to toggle favorite: {e}");
            // Re-render the button unchanged so the UI doesn't lie about state.
            FavoriteButtonTemplate {
                product_id: form.product_id,
                favorited: false,
                likes: form.likes.unwrap_or(0),
            }
            .into_response()
        }
    }
}
