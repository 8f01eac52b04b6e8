//! CSV export of orders.

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::db::OrderRepository;
use crate::middleware::RequireAdminAuth;
use crate::models::OrderExportRow;
use crate::state::AppState;

const CSV_HEADER: &str =
    "id,order_number,customer_email,status,payment_method,total,item_count,created_at";

/// Quote a CSV field per RFC 4180: wrap in quotes when it contains a comma,
/// quote, or newline, doubling any embedded quotes.
fn csv_escape(field: &str) -> String {
    if field.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render export rows to a CSV document.
fn render_csv(rows: &[OrderExportRow]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for row in rows {
        let fields = [
            row.id.to_string(),
            row.order_number.clone(),
            row.customer_email.to_string(),
            row.status.to_string(),
            row.payment_method.to_string(),
            row.total_amount.amount().to_string(),
            row.item_count.to_string(),
            row.created_at.to_rfc3339(),
        ];
        let line: Vec<String> = fields.iter().map(|f| csv_escape(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }

    out
}

/// Orders CSV export handler.
///
/// # Route
///
/// `GET /orders/export.csv`
#[instrument(skip(_admin, state))]
pub async fn orders_csv(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Response {
    let rows = match OrderRepository::new(state.pool()).export_rows().await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to export orders: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Export failed").into_response();
        }
    };

    let body = render_csv(&rows);
    tracing::info!(order_count = rows.len(), "Orders exported to CSV");

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"orders-export.csv\"",
            ),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use verdant_core::{Email, Money, OrderId, OrderStatus, PaymentMethod};

    #[test]
    fn test_csv_escape_plain() {
        assert_eq!(csv_escape("plain"), "plain");
    }

    #[test]
    fn test_csv_escape_comma_and_quote() {
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_csv_escape_newline() {
        assert_eq!(csv_escape("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn test_render_csv() {
        let rows = vec![OrderExportRow {
            id: OrderId::new(1),
            order_number: "VD-20260715-8FK2QD".to_string(),
            customer_email: Email::parse("ada@example.com").expect("valid email"),
            status: OrderStatus::Shipped,
            payment_method: PaymentMethod::Card,
            total_amount: Money::new("42.50".parse().expect("valid decimal")),
            item_count: 3,
            created_at: Utc::now(),
        }];

        let csv = render_csv(&rows);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));

        let row = lines.next().expect("one data row");
        assert!(row.starts_with("1,VD-20260715-8FK2QD,ada@example.com,shipped,card,42.50,3,"));
        assert!(lines.next().is_none());
    }
}
