//! Integration tests for the cart -> order conversion.
//!
//! Run against a migrated database with:
//! `TEST_DATABASE_URL=... cargo test -p verdant-integration-tests -- --ignored`

use verdant_core::PaymentMethod;
use verdant_integration_tests::{TestContext, money};
use verdant_storefront::db::{CartRepository, OrderRepository, RepositoryError};
use verdant_storefront::models::NewOrder;

fn new_order() -> NewOrder {
    NewOrder {
        payment_method: PaymentMethod::CashOnDelivery,
        shipping_address: "12 Fern Lane, Leafton".to_string(),
        shipping_phone: "+1 555 0100".to_string(),
    }
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn checkout_snapshots_items_and_decrements_stock() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;
    let product_a = ctx.create_product("10.00", 5).await;
    let product_b = ctx.create_product("7.50", 3).await;

    let cart = CartRepository::new(&ctx.pool);
    cart.add(user, product_a, "", 2).await.expect("add a");
    cart.add(user, product_b, "Sage", 1).await.expect("add b");

    let (order, items) = OrderRepository::new(&ctx.pool)
        .create_from_cart(user, &new_order())
        .await
        .expect("checkout succeeds");

    // N cart lines -> exactly N snapshot rows, totalled at current prices
    assert_eq!(items.len(), 2);
    assert_eq!(order.total_amount, money("27.50"));
    assert!(order.order_number.starts_with("VD-"));

    let color: Vec<Option<String>> = items.iter().map(|i| i.color_name.clone()).collect();
    assert!(color.contains(&None));
    assert!(color.contains(&Some("Sage".to_string())));

    // Stock was decremented atomically with the order
    assert_eq!(ctx.stock_of(product_a).await, 3);
    assert_eq!(ctx.stock_of(product_b).await, 2);

    // Cart is cleared by the same transaction
    let remaining = cart.lines(user).await.expect("read cart");
    assert!(remaining.is_empty());
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn checkout_with_empty_cart_is_rejected() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;

    let result = OrderRepository::new(&ctx.pool)
        .create_from_cart(user, &new_order())
        .await;

    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn checkout_rolls_back_entirely_on_insufficient_stock() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;
    let plentiful = ctx.create_product("5.00", 10).await;
    let scarce = ctx.create_product("9.00", 1).await;

    let cart = CartRepository::new(&ctx.pool);
    cart.add(user, plentiful, "", 2).await.expect("add plentiful");
    cart.add(user, scarce, "", 2).await.expect("add scarce");

    let result = OrderRepository::new(&ctx.pool)
        .create_from_cart(user, &new_order())
        .await;

    assert!(matches!(
        result,
        Err(RepositoryError::InsufficientStock { .. })
    ));

    // Nothing happened: stock untouched (even for the line processed first),
    // cart intact, no order rows.
    assert_eq!(ctx.stock_of(plentiful).await, 10);
    assert_eq!(ctx.stock_of(scarce).await, 1);
    assert_eq!(cart.lines(user).await.expect("read cart").len(), 2);

    let orders = OrderRepository::new(&ctx.pool)
        .list_for_user(user)
        .await
        .expect("list orders");
    assert!(orders.is_empty());
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn order_snapshot_survives_product_deletion() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;
    let product = ctx.create_product("15.00", 4).await;

    CartRepository::new(&ctx.pool)
        .add(user, product, "", 1)
        .await
        .expect("add to cart");

    let (order, _) = OrderRepository::new(&ctx.pool)
        .create_from_cart(user, &new_order())
        .await
        .expect("checkout succeeds");

    // Delete the product out from under the order
    sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(product)
        .execute(&ctx.pool)
        .await
        .expect("delete product");

    let (fetched, items) = OrderRepository::new(&ctx.pool)
        .get_for_user(user, order.id)
        .await
        .expect("get order")
        .expect("order still present");

    assert_eq!(fetched.total_amount, money("15.00"));
    let item = items.first().expect("snapshot row present");
    assert_eq!(item.product_price, money("15.00"));
    assert!(item.product_id.is_none());
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn cart_upserts_merge_quantities() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user().await;
    let product = ctx.create_product("4.00", 50).await;

    let cart = CartRepository::new(&ctx.pool);
    cart.add(user, product, "", 1).await.expect("first add");
    cart.add(user, product, "", 2).await.expect("second add");

    let lines = cart.lines(user).await.expect("read cart");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines.first().map(|l| l.quantity), Some(3));

    // Setting quantity replaces rather than adds
    cart.set_quantity(user, product, "", 5).await.expect("set quantity");
    let lines = cart.lines(user).await.expect("read cart");
    assert_eq!(lines.first().map(|l| l.quantity), Some(5));

    // Zero removes the line
    cart.set_quantity(user, product, "", 0).await.expect("set zero");
    assert!(cart.lines(user).await.expect("read cart").is_empty());
}
