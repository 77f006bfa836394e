//! [`Discount`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use rust_decimal::Decimal;

#[cfg(doc)]
use crate::domain::User;
use crate::domain::{booking, user};

/// Discount an operator granted to an agent [`User`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Discount {
    /// ID of the [`User`] this [`Discount`] is granted to.
    pub user_id: user::Id,

    /// [`Kind`] of this [`Discount`].
    pub kind: Kind,

    /// [`Value`] of this [`Discount`].
    pub value: Value,

    /// Whether this [`Discount`] is applied at all.
    pub is_active: bool,

    /// [`DateTime`] when this [`Discount`] was last saved.
    pub updated_at: ModificationDateTime,
}

impl Discount {
    /// Applies this [`Discount`] to the provided `subtotal` of an order of
    /// `passengers`.
    ///
    /// The discount never exceeds the `subtotal`.
    #[must_use]
    pub fn apply(
        &self,
        subtotal: Money,
        passengers: booking::Passengers,
    ) -> Applied {
        if !self.is_active || self.value.is_zero() {
            return Applied::none(subtotal);
        }

        let Kind::FlatPerPassenger = self.kind;
        let per_passenger = Money::floor(self.value.0);
        let discount =
            (per_passenger * u32::from(passengers.get())).min(subtotal);
        Applied {
            subtotal,
            discount,
            total: subtotal.saturating_sub(discount),
        }
    }
}

define_kind! {
    #[doc = "Kind of a [`Discount`]."]
    enum Kind {
        #[doc = "Flat amount off per passenger."]
        #[label = "Flat per passenger"]
        FlatPerPassenger = 1,
    }
}

/// Amount of a [`Discount`] per unit of its [`Kind`].
///
/// Fractional values are accepted and floored when applied.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "postgres",
    derive(postgres_types::FromSql, postgres_types::ToSql),
    postgres(transparent)
)]
pub struct Value(Decimal);

impl Value {
    /// Creates a new [`Value`] if the provided `value` is non-negative.
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        (!value.is_sign_negative() || value.is_zero()).then_some(Self(value))
    }

    /// Returns the underlying [`Decimal`] of this [`Value`].
    #[must_use]
    pub const fn get(&self) -> Decimal {
        self.0
    }

    /// Indicates whether this [`Value`] is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

/// Outcome of applying a [`Discount`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Applied {
    /// Price before the discount.
    pub subtotal: Money,

    /// Discount granted.
    pub discount: Money,

    /// Price to pay.
    pub total: Money,
}

impl Applied {
    /// Returns the [`Applied`] outcome of no discount at all.
    #[must_use]
    pub const fn none(subtotal: Money) -> Self {
        Self {
            subtotal,
            discount: Money::ZERO,
            total: subtotal,
        }
    }
}

/// Discount figures last saved onto an agent [`User`]'s profile.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Snapshot {
    /// Discount granted on the reference order.
    pub discount: Money,

    /// Price to pay for the reference order.
    pub total: Money,
}

impl From<Applied> for Snapshot {
    fn from(applied: Applied) -> Self {
        Self {
            discount: applied.discount,
            total: applied.total,
        }
    }
}

/// [`DateTime`] when a [`Discount`] was last saved.
pub type ModificationDateTime = DateTimeOf<(Discount, unit::Modification)>;

#[cfg(test)]
mod spec {
    use common::{DateTime, Money};
    use rust_decimal::Decimal;

    use crate::domain::{booking::Passengers, user};

    use super::{Applied, Discount, Kind, Value};

    fn discount(value: i64, is_active: bool) -> Discount {
        Discount {
            user_id: user::Id::new(),
            kind: Kind::FlatPerPassenger,
            value: Value::new(Decimal::from(value)).unwrap(),
            is_active,
            updated_at: DateTime::now().coerce(),
        }
    }

    fn rp(n: u64) -> Money {
        Money::from_rupiah(n)
    }

    fn pax(n: u16) -> Passengers {
        Passengers::new(n).unwrap()
    }

    #[test]
    fn inactive_is_noop() {
        let applied = discount(10_000, false).apply(rp(135_000), pax(3));

        assert_eq!(applied, Applied::none(rp(135_000)));
    }

    #[test]
    fn zero_value_is_noop() {
        let applied = discount(0, true).apply(rp(135_000), pax(3));

        assert_eq!(applied.total, rp(135_000));
        assert_eq!(applied.discount, Money::ZERO);
    }

    #[test]
    fn flat_per_passenger() {
        let applied = discount(10_000, true).apply(rp(135_000), pax(3));

        assert_eq!(applied.discount, rp(30_000));
        assert_eq!(applied.total, rp(105_000));
    }

    #[test]
    fn capped_at_subtotal() {
        let applied = discount(60_000, true).apply(rp(135_000), pax(3));

        assert_eq!(applied.discount, rp(135_000));
        assert_eq!(applied.total, Money::ZERO);
    }

    #[test]
    fn floors_fractional_value() {
        let mut d = discount(0, true);
        d.value = Value::new(Decimal::new(99_995, 1)).unwrap();

        let applied = d.apply(rp(100_000), pax(2));

        assert_eq!(applied.discount, rp(19_998));
        assert_eq!(applied.total, rp(80_002));
    }

    #[test]
    fn rejects_negative_value() {
        assert!(Value::new(Decimal::from(-1)).is_none());
        assert!(Value::new(Decimal::ZERO).is_some());
    }
}
