//! [`Percent`]-related definitions.

use std::str::FromStr;

use derive_more::Display;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::{prelude::ToPrimitive as _, Decimal};

/// Floating-point percentage.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Percent(Decimal);

impl Percent {
    /// A [`Percent`] of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Percent`] by checking the provided values is
    /// greater than `0` and less than `100`.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        if val < Decimal::ZERO || val > Decimal::ONE_HUNDRED {
            None
        } else {
            #[expect(
                clippy::allow_attributes,
                reason = "TODO: Remove once clippy is fixed"
            )]
            #[allow(unsafe_code, reason = "invariants checked already")]
            Some(unsafe { Self::new_unchecked(val) })
        }
    }

    /// Creates a new [`Percent`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The provided value must be greater than `0` and less than `100`.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(val: Decimal) -> Self {
        Self(val)
    }

    /// Creates a new [`Percent`] from the provided amount of basis points
    /// (`1/100` of a percent).
    #[must_use]
    pub fn from_basis_points(bp: i32) -> Option<Self> {
        Self::new(Decimal::from(bp) / Decimal::ONE_HUNDRED)
    }

    /// Returns this [`Percent`] as an amount of basis points (`1/100` of a
    /// percent), truncated.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn basis_points(self) -> i32 {
        (self.0 * Decimal::ONE_HUNDRED)
            .trunc()
            .to_i32()
            .expect("fits into `i32`")
    }

    /// Returns the inner [`Decimal`] value of this [`Percent`].
    #[must_use]
    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    /// Indicates whether this [`Percent`] is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl FromStr for Percent {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid percent value")
    }
}

#[cfg(test)]
mod spec {
    use super::Percent;

    #[test]
    fn rejects_out_of_range_values() {
        assert!("101".parse::<Percent>().is_err());
        assert!("-0.5".parse::<Percent>().is_err());
        assert!("0".parse::<Percent>().is_ok());
        assert!("100".parse::<Percent>().is_ok());
    }

    #[test]
    fn basis_points_round_trip() {
        let pct: Percent = "9".parse().unwrap();
        assert_eq!(pct.basis_points(), 900);
        assert_eq!(Percent::from_basis_points(900), Some(pct));

        assert_eq!("13.12".parse::<Percent>().unwrap().basis_points(), 1312);
        assert_eq!(Percent::ZERO.basis_points(), 0);
    }
}
