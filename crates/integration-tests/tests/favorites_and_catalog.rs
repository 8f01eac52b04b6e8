//! Integration tests for favorites and admin catalog management.
//!
//! Run against a migrated database with:
//! `TEST_DATABASE_URL=... cargo test -p verdant-integration-tests -- --ignored`

use verdant_admin::db::{
    CategoryRepository as AdminCategoryRepository, OrderRepository as AdminOrderRepository,
    ProductRepository as AdminProductRepository, RepositoryError as AdminRepositoryError,
};
use verdant_core::{CategoryId, OrderStatus};
use verdant_integration_tests::TestContext;
use verdant_storefront::db::FavoriteRepository;

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn favorite_toggle_tracks_like_counter() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;
    let product = ctx.create_product("10.00", 5).await;

    let favorites = FavoriteRepository::new(&ctx.pool);

    let (favorited, likes) = favorites.toggle(user, product).await.expect("toggle on");
    assert!(favorited);
    assert_eq!(likes, 1);
    assert_eq!(ctx.likes_of(product).await, 1);
    assert!(favorites.is_favorite(user, product).await.expect("check"));

    let (favorited, likes) = favorites.toggle(user, product).await.expect("toggle off");
    assert!(!favorited);
    assert_eq!(likes, 0);
    assert_eq!(ctx.likes_of(product).await, 0);
    assert!(!favorites.is_favorite(user, product).await.expect("check"));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn deleting_category_with_products_is_rejected() {
    let ctx = TestContext::new().await;
    let categories = AdminCategoryRepository::new(&ctx.pool);

    let category = categories
        .create(
            &format!("Test Category {}", verdant_integration_tests::unique_suffix()),
            "temporary",
        )
        .await
        .expect("create category");

    // Attach a product to it
    let product = ctx.create_product("5.00", 1).await;
    sqlx::query("UPDATE products SET category_id = $1 WHERE id = $2")
        .bind(category)
        .bind(product)
        .execute(&ctx.pool)
        .await
        .expect("attach product");

    let result = categories.delete(category).await;
    assert!(matches!(result, Err(AdminRepositoryError::Conflict(_))));

    // Detach and retry
    sqlx::query("UPDATE products SET category_id = NULL WHERE id = $1")
        .bind(product)
        .execute(&ctx.pool)
        .await
        .expect("detach product");

    assert!(categories.delete(category).await.expect("delete succeeds"));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn missing_category_delete_returns_false() {
    let ctx = TestContext::new().await;

    let deleted = AdminCategoryRepository::new(&ctx.pool)
        .delete(CategoryId::new(-1))
        .await
        .expect("delete runs");
    assert!(!deleted);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn stock_adjustment_refuses_negative() {
    let ctx = TestContext::new().await;
    let product = ctx.create_product("5.00", 2).await;

    let products = AdminProductRepository::new(&ctx.pool);

    let stock = products.adjust_stock(product, 3).await.expect("raise stock");
    assert_eq!(stock, 5);

    let result = products.adjust_stock(product, -10).await;
    assert!(matches!(result, Err(AdminRepositoryError::Conflict(_))));
    assert_eq!(ctx.stock_of(product).await, 5);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn resend_counter_is_capped() {
    use verdant_core::PaymentMethod;
    use verdant_storefront::db::{CartRepository, OrderRepository};
    use verdant_storefront::models::NewOrder;

    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;
    let product = ctx.create_product("3.00", 10).await;

    CartRepository::new(&ctx.pool)
        .add(user, product, "", 1)
        .await
        .expect("add to cart");

    let (order, _) = OrderRepository::new(&ctx.pool)
        .create_from_cart(
            user,
            &NewOrder {
                payment_method: PaymentMethod::Card,
                shipping_address: "12 Fern Lane".to_string(),
                shipping_phone: "+1 555 0100".to_string(),
            },
        )
        .await
        .expect("checkout succeeds");

    let admin_orders = AdminOrderRepository::new(&ctx.pool);

    for expected in 1..=verdant_admin::db::orders::MAX_EMAIL_RESENDS {
        let count = admin_orders
            .increment_resend_count(order.id)
            .await
            .expect("under the cap");
        assert_eq!(count, expected);
    }

    let result = admin_orders.increment_resend_count(order.id).await;
    assert!(matches!(result, Err(AdminRepositoryError::Conflict(_))));

    // Status updates still work after the cap
    admin_orders
        .update_status(order.id, OrderStatus::Processing)
        .await
        .expect("status update");
}
