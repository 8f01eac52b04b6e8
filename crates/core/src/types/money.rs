//! Monetary amounts backed by decimal arithmetic.
//!
//! All prices in Verdant are stored as `NUMERIC` in the database and carried
//! as [`Money`] in code. The store currently trades in a single currency, so
//! the type wraps a bare [`Decimal`] and renders with a dollar sign; a
//! currency code would be added here if that ever changes.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount in the store currency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a `Money` from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply a unit price by a line quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format for display, e.g. `$19.99`.
    ///
    /// Negative amounts render as `-$4.20` (refund-style), not `$-4.20`.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self.0.round_dp(2);
        if rounded.is_sign_negative() {
            format!("-${:.2}", -rounded)
        } else {
            format!("${rounded:.2}")
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

// SQLx support (with postgres feature): Money maps to NUMERIC.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::new(s.parse().unwrap())
    }

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(money("19.99").display(), "$19.99");
        assert_eq!(money("5").display(), "$5.00");
        assert_eq!(money("0.005").display(), "$0.00");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(money("-4.2").display(), "-$4.20");
    }

    #[test]
    fn test_times() {
        assert_eq!(money("2.50").times(3), money("7.50"));
        assert_eq!(money("19.99").times(0), Money::ZERO);
    }

    #[test]
    fn test_sum() {
        let total: Money = [money("1.10"), money("2.20"), money("3.30")]
            .into_iter()
            .sum();
        assert_eq!(total, money("6.60"));
    }

    #[test]
    fn test_serde_transparent() {
        let m = money("12.50");
        let json = serde_json::to_string(&m).unwrap();
        let parsed: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, m);
    }
}
