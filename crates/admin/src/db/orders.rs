//! Order repository: management-side reads and status updates.

use sqlx::PgPool;

use verdant_core::{Money, OrderId, OrderStatus};

use super::RepositoryError;
use crate::models::{DashboardStats, OrderExportRow, OrderItem, OrderWithCustomer};

/// Orders never get their confirmation email re-sent more than this many times.
pub const MAX_EMAIL_RESENDS: i32 = 5;

const ORDER_WITH_CUSTOMER: &str = r"
    SELECT o.id, o.user_id, o.order_number, o.status, o.payment_method,
           o.shipping_address, o.shipping_phone, o.total_amount,
           o.resend_email_count, o.created_at, o.updated_at,
           u.email AS customer_email, u.name AS customer_name,
           (SELECT COALESCE(SUM(oi.quantity), 0)
            FROM order_items oi WHERE oi.order_id = o.id) AS item_count
    FROM orders o
    JOIN users u ON u.id = o.user_id
";

/// Repository for order management.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OrderWithCustomer>, RepositoryError> {
        let query = format!(
            r"
            {ORDER_WITH_CUSTOMER}
            WHERE ($1::order_status IS NULL OR o.status = $1)
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT $2 OFFSET $3
            "
        );

        let orders = sqlx::query_as::<_, OrderWithCustomer>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        Ok(orders)
    }

    /// Count orders, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, status: Option<OrderStatus>) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE ($1::order_status IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Get an order with customer data and its snapshot items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: OrderId,
    ) -> Result<Option<(OrderWithCustomer, Vec<OrderItem>)>, RepositoryError> {
        let query = format!("{ORDER_WITH_CUSTOMER} WHERE o.id = $1");

        let Some(order) = sqlx::query_as::<_, OrderWithCustomer>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, product_name, product_price,
                   color_name, quantity
            FROM order_items
            WHERE order_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some((order, items)))
    }

    /// Update an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Increment the confirmation-email resend counter, enforcing the cap.
    ///
    /// # Returns
    ///
    /// The new resend count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` once the cap is reached,
    /// `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn increment_resend_count(&self, id: OrderId) -> Result<i32, RepositoryError> {
        let count = sqlx::query_scalar::<_, i32>(
            r"
            UPDATE orders
            SET resend_email_count = resend_email_count + 1, updated_at = now()
            WHERE id = $1 AND resend_email_count < $2
            RETURNING resend_email_count
            ",
        )
        .bind(id)
        .bind(MAX_EMAIL_RESENDS)
        .fetch_optional(self.pool)
        .await?;

        match count {
            Some(count) => Ok(count),
            None => {
                let exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS (SELECT 1 FROM orders WHERE id = $1)",
                )
                .bind(id)
                .fetch_one(self.pool)
                .await?;

                if exists {
                    Err(RepositoryError::Conflict(format!(
                        "confirmation email already re-sent {MAX_EMAIL_RESENDS} times"
                    )))
                } else {
                    Err(RepositoryError::NotFound)
                }
            }
        }
    }

    /// Aggregate order counts and revenue for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<DashboardStats, RepositoryError> {
        let rows = sqlx::query_as::<_, (OrderStatus, i64, Option<Money>)>(
            r"
            SELECT status, COUNT(*), SUM(total_amount)
            FROM orders
            GROUP BY status
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let mut stats = DashboardStats::default();
        for (status, count, total) in rows {
            stats.total_orders += count;
            match status {
                OrderStatus::Pending => stats.pending = count,
                OrderStatus::Processing => stats.processing = count,
                OrderStatus::Shipped => stats.shipped = count,
                OrderStatus::Delivered => stats.delivered = count,
                OrderStatus::Cancelled => stats.cancelled = count,
            }
            if status != OrderStatus::Cancelled {
                stats.revenue += total.unwrap_or(Money::ZERO);
            }
        }

        Ok(stats)
    }

    /// Flatten every order into a row for the CSV export, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn export_rows(&self) -> Result<Vec<OrderExportRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderExportRow>(
            r"
            SELECT o.id, o.order_number, u.email AS customer_email, o.status,
                   o.payment_method, o.total_amount,
                   (SELECT COALESCE(SUM(oi.quantity), 0)
                    FROM order_items oi WHERE oi.order_id = o.id) AS item_count,
                   o.created_at
            FROM orders o
            JOIN users u ON u.id = o.user_id
            ORDER BY o.created_at DESC, o.id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}
