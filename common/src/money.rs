//! [`Money`]-related definitions.

use std::{ops, str::FromStr};

use derive_more::Display;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::{prelude::ToPrimitive as _, Decimal};

use crate::Percent;

/// Monetary amount in whole currency units.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Money(i64);

impl Money {
    /// [`Money`] amount of zero.
    pub const ZERO: Self = Self(0);

    /// Creates a new [`Money`] by checking the provided amount is not
    /// negative.
    #[must_use]
    pub fn new(amount: i64) -> Option<Self> {
        (amount >= 0).then_some(Self(amount))
    }

    /// Returns the amount of this [`Money`].
    #[must_use]
    pub fn amount(self) -> i64 {
        self.0
    }

    /// Returns the provided [`Percent`] of this [`Money`] amount, rounded
    /// down to the nearest whole unit.
    ///
    /// Rounding down keeps a computed increment from ever exceeding the
    /// exact fraction it represents.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn percent_of(self, percent: Percent) -> Self {
        let exact =
            Decimal::from(self.0) * percent.as_decimal() / Decimal::ONE_HUNDRED;
        Self(exact.floor().to_i64().expect("fits into `i64`"))
    }
}

impl ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        i64::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Money` amount")
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use crate::Percent;

    use super::Money;

    fn percent(s: &str) -> Percent {
        s.parse().unwrap()
    }

    #[test]
    fn rejects_negative_amounts() {
        assert!(Money::new(-1).is_none());
        assert_eq!(Money::new(0), Some(Money::ZERO));
        assert!(Money::new(1_000_000).is_some());
    }

    #[test]
    fn computes_percent_of_amount() {
        let canon = Money::new(1_000_000).unwrap();

        let increment = canon.percent_of(percent("9"));
        assert_eq!(increment.amount(), 90_000);
        assert_eq!((canon + increment).amount(), 1_090_000);
    }

    #[test]
    fn percent_of_rounds_down() {
        // 9% of 1111 is 99.99, so the increment is 99.
        assert_eq!(
            Money::new(1111).unwrap().percent_of(percent("9")).amount(),
            99,
        );
        assert_eq!(
            Money::new(999).unwrap().percent_of(percent("13.12")).amount(),
            131,
        );
    }

    #[test]
    fn zero_percent_yields_zero() {
        let canon = Money::new(850_000).unwrap();
        assert_eq!(canon.percent_of(Percent::ZERO), Money::ZERO);
        assert_eq!(canon + canon.percent_of(Percent::ZERO), canon);
    }

    #[test]
    fn from_str() {
        assert_eq!(Money::from_str("1000000").unwrap().amount(), 1_000_000);
        assert!(Money::from_str("-5").is_err());
        assert!(Money::from_str("12.50").is_err());
    }
}
