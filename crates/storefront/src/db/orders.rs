//! Order repository.
//!
//! Checkout is one transaction: lock the cart's products, decrement stock,
//! snapshot each line into `order_items`, and clear the cart. Any failure
//! (including insufficient stock) rolls the whole order back, so there is no
//! window where an order exists without its items or stock was taken without
//! an order.

use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::PgPool;

use verdant_core::{Money, OrderId, UserId};

use super::RepositoryError;
use crate::models::{CartLine, NewOrder, Order, OrderItem};

const ORDER_COLUMNS: &str = "id, user_id, order_number, status, payment_method, \
     shipping_address, shipping_phone, total_amount, resend_email_count, \
     created_at, updated_at";

const ORDER_ITEM_COLUMNS: &str =
    "id, order_id, product_id, product_name, product_price, color_name, quantity";

/// Generate a human-facing order number, e.g. `VD-20260715-8FK2QD`.
///
/// The suffix alphabet omits look-alike characters (0/O, 1/I/L) since these
/// numbers end up read over the phone.
fn generate_order_number(now: DateTime<Utc>) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
    const SUFFIX_LEN: usize = 6;

    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            // SAFETY: idx is always within bounds since random_range returns 0..CHARSET.len()
            char::from(*CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect();

    format!("VD-{}-{}", now.format("%Y%m%d"), suffix)
}

/// Repository for order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Convert the user's cart into an order.
    ///
    /// Runs as a single transaction:
    /// 1. Read cart lines joined with products, locking the product rows.
    /// 2. Conditionally decrement stock per line; abort on shortfall.
    /// 3. Insert the order and one snapshot row per line.
    /// 4. Clear the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the cart is empty.
    /// Returns `RepositoryError::InsufficientStock` naming the first product
    /// whose stock cannot cover the requested quantity.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_from_cart(
        &self,
        user_id: UserId,
        input: &NewOrder,
    ) -> Result<(Order, Vec<OrderItem>), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Lock product rows for the duration of the transaction so two
        // concurrent checkouts cannot both pass the stock check.
        let lines = sqlx::query_as::<_, CartLine>(
            r"
            SELECT ci.product_id, p.name, p.price, ci.color_name, ci.quantity,
                   p.stock, p.images[1] AS image
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.user_id = $1
            ORDER BY ci.product_id ASC
            FOR UPDATE OF p
            ",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Err(RepositoryError::Conflict("cart is empty".to_owned()));
        }

        let mut total = Money::ZERO;
        for line in &lines {
            let updated = sqlx::query(
                r"
                UPDATE products
                SET stock = stock - $2, ordered_count = ordered_count + $2
                WHERE id = $1 AND stock >= $2
                ",
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(RepositoryError::InsufficientStock {
                    product: line.name.clone(),
                });
            }

            total += line.line_total();
        }

        let order_number = generate_order_number(Utc::now());
        let insert_order = format!(
            r"
            INSERT INTO orders
                (user_id, order_number, payment_method, shipping_address,
                 shipping_phone, total_amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ORDER_COLUMNS}
            "
        );

        let order = sqlx::query_as::<_, Order>(&insert_order)
            .bind(user_id)
            .bind(&order_number)
            .bind(input.payment_method)
            .bind(&input.shipping_address)
            .bind(&input.shipping_phone)
            .bind(total)
            .fetch_one(&mut *tx)
            .await?;

        let insert_item = format!(
            r"
            INSERT INTO order_items
                (order_id, product_id, product_name, product_price, color_name, quantity)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ORDER_ITEM_COLUMNS}
            "
        );

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let color_name = if line.color_name.is_empty() {
                None
            } else {
                Some(line.color_name.as_str())
            };

            let item = sqlx::query_as::<_, OrderItem>(&insert_item)
                .bind(order.id)
                .bind(line.product_id)
                .bind(&line.name)
                .bind(line.price)
                .bind(color_name)
                .bind(line.quantity)
                .fetch_one(&mut *tx)
                .await?;

            items.push(item);
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok((order, items))
    }

    /// List the user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let query = format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "
        );

        let orders = sqlx::query_as::<_, Order>(&query)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        Ok(orders)
    }

    /// Get one of the user's orders with its items.
    ///
    /// Scoped by user so one customer cannot read another's order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<(Order, Vec<OrderItem>)>, RepositoryError> {
        let query = format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE id = $1 AND user_id = $2
            "
        );

        let Some(order) = sqlx::query_as::<_, Order>(&query)
            .bind(order_id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let items = self.items(order_id).await?;

        Ok(Some((order, items)))
    }

    /// List the snapshot items of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let query = format!(
            r"
            SELECT {ORDER_ITEM_COLUMNS}
            FROM order_items
            WHERE order_id = $1
            ORDER BY id ASC
            "
        );

        let items = sqlx::query_as::<_, OrderItem>(&query)
            .bind(order_id)
            .fetch_all(self.pool)
            .await?;

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_shape() {
        let now = "2026-07-15T12:00:00Z".parse::<DateTime<Utc>>().expect("valid timestamp");
        let number = generate_order_number(now);

        let mut parts = number.split('-');
        assert_eq!(parts.next(), Some("VD"));
        assert_eq!(parts.next(), Some("20260715"));

        let suffix = parts.next().expect("suffix present");
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert!(parts.next().is_none());
    }

    #[test]
    fn test_order_number_excludes_lookalikes() {
        let now = Utc::now();
        for _ in 0..50 {
            let number = generate_order_number(now);
            let suffix = number.rsplit('-').next().expect("suffix present");
            assert!(!suffix.contains(['0', 'O', '1', 'I', 'L']));
        }
    }
}
