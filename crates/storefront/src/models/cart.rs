//! Cart domain types.

use verdant_core::{Money, ProductId};

/// One cart line joined with its live product row.
///
/// Carries current price and stock so checkout can validate and total without
/// a second round of reads.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartLine {
    pub product_id: ProductId,
    /// Product name at read time (live, not a snapshot).
    pub name: String,
    pub price: Money,
    /// Selected color; empty string means no color chosen.
    pub color_name: String,
    pub quantity: i32,
    pub stock: i32,
    pub image: Option<String>,
}

impl CartLine {
    /// Line total at the current product price.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price.times(u32::try_from(self.quantity).unwrap_or(0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let line = CartLine {
            product_id: ProductId::new(1),
            name: "Monstera".to_string(),
            price: Money::new("12.50".parse().unwrap()),
            color_name: String::new(),
            quantity: 3,
            stock: 10,
            image: None,
        };
        assert_eq!(line.line_total().display(), "$37.50");
    }
}
