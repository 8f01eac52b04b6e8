//! Catalog domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use verdant_core::{CategoryId, Money, ProductId};

/// A product row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Markdown source; render with `services::markdown` before display.
    pub description: String,
    pub price: Money,
    pub stock: i32,
    /// Ordered image URLs; the first entry is the cover image.
    pub images: Vec<String>,
    pub category_id: Option<CategoryId>,
    pub likes: i32,
    pub ordered_count: i32,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The cover image URL, if any images are set.
    #[must_use]
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A color option for a product.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductColor {
    pub name: String,
    pub hex: String,
    pub image: Option<String>,
}

/// A product category.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
}
