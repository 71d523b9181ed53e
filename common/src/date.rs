//! Calendar date utilities.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{cmp::Ordering, fmt, marker::PhantomData};

use derive_more::Debug;
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};

/// Untyped calendar date.
pub type Date = DateOf;

/// Calendar date without a time component.
#[derive(Debug)]
pub struct DateOf<Of: ?Sized = ()> {
    /// Inner representation of the date.
    inner: time::Date,

    /// Type parameter describing the kind of date.
    #[debug(skip)]
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateOf<Of> {
    /// Creates a new [`Date`] representing the current date (UTC).
    #[must_use]
    pub fn today() -> Self {
        Self {
            inner: time::OffsetDateTime::now_utc().date(),
            _of: PhantomData,
        }
    }

    /// Creates a new [`Date`] from the provided calendar components.
    ///
    /// [`None`] is returned if the components don't form a valid date.
    #[must_use]
    pub fn from_calendar_date(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = time::Month::try_from(month).ok()?;
        Some(Self {
            inner: time::Date::from_calendar_date(year, month, day).ok()?,
            _of: PhantomData,
        })
    }

    /// Returns the year of this [`Date`].
    #[must_use]
    pub fn year(&self) -> i32 {
        self.inner.year()
    }

    /// Returns the month of this [`Date`] (1-based).
    #[must_use]
    pub fn month(&self) -> u8 {
        u8::from(self.inner.month())
    }

    /// Returns the day of this [`Date`] (1-based).
    #[must_use]
    pub fn day(&self) -> u8 {
        self.inner.day()
    }

    /// Returns this [`Date`] shifted forward by the provided number of
    /// calendar months.
    ///
    /// The day is clamped down to the last valid day of the target month,
    /// so shifting never rolls over into the following month.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn shift_months(self, months: u32) -> Self {
        let zero_based = i64::from(u8::from(self.inner.month())) - 1
            + i64::from(months);
        let year = self.inner.year()
            + i32::try_from(zero_based / 12).expect("`year` overflow");
        let month = time::Month::try_from(
            u8::try_from(zero_based % 12 + 1).expect("within `1..=12`"),
        )
        .expect("within `1..=12`");
        let day = self
            .inner
            .day()
            .min(time::util::days_in_year_month(year, month));
        Self {
            inner: time::Date::from_calendar_date(year, month, day)
                .expect("day clamped to a valid one"),
            _of: PhantomData,
        }
    }

    /// Returns this [`Date`] shifted by the provided number of days.
    #[expect(clippy::missing_panics_doc, reason = "unrealistic to overflow")]
    #[must_use]
    pub fn shift_days(self, days: i64) -> Self {
        Self {
            inner: self
                .inner
                .checked_add(time::Duration::days(days))
                .expect("`Date` overflow"),
            _of: PhantomData,
        }
    }

    /// Returns the [`MonthDay`] of this [`Date`].
    #[must_use]
    pub fn month_day(&self) -> MonthDay {
        MonthDay {
            month: self.month(),
            day: self.day(),
        }
    }

    /// Indicates whether this [`Date`] falls into the same calendar month of
    /// the same year as the `other` one.
    #[must_use]
    pub fn same_month(&self, other: &Self) -> bool {
        self.inner.year() == other.inner.year()
            && self.inner.month() == other.inner.month()
    }

    /// Coerces one kind of [`Date`] into another.
    #[must_use]
    pub fn coerce<NewOf: ?Sized>(self) -> DateOf<NewOf> {
        DateOf {
            inner: self.inner,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> fmt::Display for DateOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl<Of: ?Sized> Copy for DateOf<Of> {}
impl<Of: ?Sized> Clone for DateOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateOf<Of> {}
impl<Of: ?Sized> PartialEq for DateOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<Of: ?Sized> Ord for DateOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<Of: ?Sized> PartialOrd for DateOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of: ?Sized> From<time::Date> for DateOf<Of> {
    fn from(inner: time::Date) -> Self {
        Self {
            inner,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> From<DateOf<Of>> for time::Date {
    fn from(date: DateOf<Of>) -> Self {
        date.inner
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> FromSql<'_> for DateOf<Of> {
    accepts!(DATE);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Date::from_sql(ty, raw).map(Into::into)
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> ToSql for DateOf<Of> {
    accepts!(DATE);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.inner.to_sql(ty, w)
    }
}

/// Month and day of a [`Date`], disregarding the year.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MonthDay {
    /// Month (1-based).
    pub month: u8,

    /// Day of the month (1-based).
    pub day: u8,
}

#[cfg(test)]
mod spec {
    use super::Date;

    fn date(year: i32, month: u8, day: u8) -> Date {
        Date::from_calendar_date(year, month, day).unwrap()
    }

    #[test]
    fn shifts_plain_months() {
        assert_eq!(date(2024, 3, 15).shift_months(12), date(2025, 3, 15));
        assert_eq!(date(2024, 1, 31).shift_months(12), date(2025, 1, 31));
        assert_eq!(date(2024, 11, 30).shift_months(3), date(2025, 2, 28));
    }

    #[test]
    fn clamps_day_to_target_month() {
        // Leap February keeps the 29th, no roll over into March.
        assert_eq!(date(2024, 1, 31).shift_months(1), date(2024, 2, 29));
        assert_eq!(date(2023, 1, 31).shift_months(1), date(2023, 2, 28));
        assert_eq!(date(2024, 3, 31).shift_months(1), date(2024, 4, 30));
    }

    #[test]
    fn crosses_year_boundary() {
        assert_eq!(date(2024, 12, 31).shift_months(1), date(2025, 1, 31));
        assert_eq!(date(2024, 7, 1).shift_months(18), date(2026, 1, 1));
    }

    #[test]
    fn shifts_days() {
        assert_eq!(date(2024, 2, 28).shift_days(1), date(2024, 2, 29));
        assert_eq!(date(2024, 12, 31).shift_days(60), date(2025, 3, 1));
        assert_eq!(date(2024, 3, 1).shift_days(-1), date(2024, 2, 29));
    }

    #[test]
    fn same_month_is_year_aware() {
        assert!(date(2024, 5, 1).same_month(&date(2024, 5, 31)));
        assert!(!date(2024, 5, 1).same_month(&date(2025, 5, 1)));
        assert!(!date(2024, 5, 1).same_month(&date(2024, 6, 1)));
    }

    #[test]
    fn month_day_matches_anniversaries() {
        assert_eq!(
            date(2023, 4, 12).month_day(),
            date(2026, 4, 12).month_day(),
        );
        assert_ne!(
            date(2023, 4, 12).month_day(),
            date(2023, 5, 12).month_day(),
        );
    }
}
