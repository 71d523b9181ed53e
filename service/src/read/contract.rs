//! [`Contract`] read model definition.

use common::{date::MonthDay, Date, Money};

use crate::domain::contract::Lease;
#[cfg(doc)]
use crate::domain::Contract;

/// Wrapper around [`Contract`] indicating that it [`is_active()`].
///
/// [`is_active()`]: Contract::is_active
#[derive(Clone, Debug)]
pub struct Active<T>(pub T);

/// Selector of active [`Lease`]s ending within an inclusive [`Date`] window.
#[derive(Clone, Copy, Debug)]
pub struct ExpiringWithin {
    /// Earliest end [`Date`] (inclusive) of the selected [`Lease`]s.
    pub from: Date,

    /// Latest end [`Date`] (inclusive) of the selected [`Lease`]s.
    pub until: Date,
}

/// Selector of active [`Lease`]s whose start date anniversary falls on the
/// provided [`MonthDay`], still in force past it.
#[derive(Clone, Copy, Debug)]
pub struct AnniversaryOn {
    /// Month and day the anniversary falls on.
    pub month_day: MonthDay,

    /// [`Date`] the selected [`Lease`]s must remain in force after.
    pub beyond: Date,
}

/// Active [`Lease`] approaching its end, along with the canon it would have
/// after an indexation at the latest published index value.
#[derive(Clone, Debug)]
pub struct Expiring {
    /// The expiring [`Lease`].
    pub lease: Lease,

    /// Canon the [`Lease`] would carry after indexation.
    pub projected_canon: Money,
}

pub mod list {
    //! [`Contract`]s list definitions.

    use common::define_pagination;
    use derive_more::{From, Into};

    use crate::domain::contract;
    #[cfg(doc)]
    use crate::domain::Contract;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = (contract::Id, contract::Kind);

    /// Cursor pointing to a specific [`Contract`] in a list.
    pub type Cursor = contract::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// [`contract::Kind`] to narrow the list down to.
        pub kind: Option<contract::Kind>,
    }

    /// Total count of [`Contract`]s.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);
}
