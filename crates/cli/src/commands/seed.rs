//! Seed the catalog with demo data for local development.

use rust_decimal::Decimal;
use sqlx::PgPool;

use verdant_core::CategoryId;

use super::{CommandError, connect};

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: &'static str,
    stock: i32,
    category: &'static str,
    featured: bool,
    colors: &'static [(&'static str, &'static str)],
}

const CATEGORIES: &[(&str, &str)] = &[
    ("Houseplants", "Leafy friends for every room"),
    ("Pots & Planters", "Ceramics and terracotta"),
    ("Care", "Soil, food, and tools"),
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Monstera Deliciosa",
        description: "# Monstera\n\nThe classic split-leaf. Thrives in bright, indirect light.",
        price: "34.00",
        stock: 12,
        category: "Houseplants",
        featured: true,
        colors: &[],
    },
    SeedProduct {
        name: "Snake Plant",
        description: "Nearly indestructible. Waters itself, almost.",
        price: "22.50",
        stock: 30,
        category: "Houseplants",
        featured: true,
        colors: &[],
    },
    SeedProduct {
        name: "Ripple Ceramic Pot",
        description: "Hand-glazed stoneware, 6\" with drainage hole.",
        price: "18.00",
        stock: 45,
        category: "Pots & Planters",
        featured: false,
        colors: &[("Sage", "#9caf88"), ("Terracotta", "#c8553d"), ("Cream", "#f5f0e1")],
    },
    SeedProduct {
        name: "Organic Potting Mix",
        description: "5L bag. Chunky, well-draining, ready for aroids.",
        price: "9.50",
        stock: 80,
        category: "Care",
        featured: false,
        colors: &[],
    },
];

/// Seed demo categories and products.
///
/// Idempotent: rows that already exist (by unique name) are left alone.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    for (name, description) in CATEGORIES {
        sqlx::query(
            r"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            ",
        )
        .bind(name)
        .bind(description)
        .execute(&pool)
        .await?;
    }
    tracing::info!(count = CATEGORIES.len(), "Categories seeded");

    for product in PRODUCTS {
        seed_product(&pool, product).await?;
    }
    tracing::info!(count = PRODUCTS.len(), "Products seeded");

    Ok(())
}

async fn seed_product(pool: &PgPool, product: &SeedProduct) -> Result<(), CommandError> {
    let category_id = sqlx::query_scalar::<_, CategoryId>(
        "SELECT id FROM categories WHERE name = $1",
    )
    .bind(product.category)
    .fetch_optional(pool)
    .await?;

    let price: Decimal = product
        .price
        .parse()
        .map_err(|_| CommandError::Invalid(format!("bad seed price for {}", product.name)))?;

    // Skip products that are already present (seeding is re-runnable).
    let existing = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM products WHERE name = $1)",
    )
    .bind(product.name)
    .fetch_one(pool)
    .await?;

    if existing {
        return Ok(());
    }

    let product_id = sqlx::query_scalar::<_, i32>(
        r"
        INSERT INTO products (name, description, price, stock, category_id, featured)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        ",
    )
    .bind(product.name)
    .bind(product.description)
    .bind(price)
    .bind(product.stock)
    .bind(category_id)
    .bind(product.featured)
    .fetch_one(pool)
    .await?;

    for (position, (name, hex)) in product.colors.iter().enumerate() {
        sqlx::query(
            r"
            INSERT INTO product_colors (product_id, name, hex, position)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(product_id)
        .bind(name)
        .bind(hex)
        .bind(i32::try_from(position).unwrap_or(0))
        .execute(pool)
        .await?;
    }

    Ok(())
}
