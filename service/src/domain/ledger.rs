//! Wallet ledger [`Entry`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::User;
use crate::domain::{booking, user};

/// Movement of a [`User`]'s wallet balance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    /// ID of this [`Entry`].
    pub id: Id,

    /// ID of the [`User`] whose balance moved.
    pub user_id: user::Id,

    /// [`Kind`] of this [`Entry`], telling the direction of the movement.
    pub kind: Kind,

    /// Amount moved.
    pub amount: Money,

    /// Balance right after this [`Entry`].
    pub balance_after: Money,

    /// [`Description`] of this [`Entry`].
    pub description: Description,

    /// [`DateTime`] when this [`Entry`] was recorded.
    pub created_at: CreationDateTime,
}

impl Entry {
    /// Creates a new [`Kind::TopUp`] [`Entry`] crediting `amount` onto the
    /// provided `balance`.
    #[must_use]
    pub fn top_up(user_id: user::Id, balance: Money, amount: Money) -> Self {
        Self {
            id: Id::new(),
            user_id,
            kind: Kind::TopUp,
            amount,
            balance_after: balance + amount,
            description: Description(format!("Top up {}", amount.rupiah())),
            created_at: DateTimeOf::now(),
        }
    }

    /// Creates a new [`Kind::Payment`] [`Entry`] debiting `amount` off the
    /// provided `balance` for paying the [`booking::Booking`].
    ///
    /// [`None`] is returned if the `balance` doesn't cover the `amount`.
    #[must_use]
    pub fn payment(
        user_id: user::Id,
        balance: Money,
        amount: Money,
        booking_id: booking::Id,
    ) -> Option<Self> {
        Some(Self {
            id: Id::new(),
            user_id,
            kind: Kind::Payment,
            amount,
            balance_after: balance.checked_sub(amount)?,
            description: Description(format!("Payment of booking {booking_id}")),
            created_at: DateTimeOf::now(),
        })
    }
}

/// ID of an [`Entry`].
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new time-ordered [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

define_kind! {
    #[doc = "Kind of a ledger [`Entry`]."]
    enum Kind {
        #[doc = "Balance credited."]
        #[label = "Top up"]
        TopUp = 1,

        #[doc = "Balance debited for a booking."]
        #[label = "Payment"]
        Payment = 2,
    }
}

/// Human-readable description of an [`Entry`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

/// [`DateTime`] when an [`Entry`] was recorded.
pub type CreationDateTime = DateTimeOf<(Entry, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::domain::{booking, user};

    use super::{Entry, Kind};

    #[test]
    fn top_up_credits() {
        let entry = Entry::top_up(
            user::Id::new(),
            Money::from_rupiah(20_000),
            Money::from_rupiah(1_000_000),
        );

        assert_eq!(entry.kind, Kind::TopUp);
        assert_eq!(entry.balance_after, Money::from_rupiah(1_020_000));
        assert_eq!(entry.description.to_string(), "Top up Rp 1.000.000");
    }

    #[test]
    fn payment_debits() {
        let entry = Entry::payment(
            user::Id::new(),
            Money::from_rupiah(200_000),
            Money::from_rupiah(105_000),
            booking::Id::new(),
        )
        .unwrap();

        assert_eq!(entry.kind, Kind::Payment);
        assert_eq!(entry.balance_after, Money::from_rupiah(95_000));
    }

    #[test]
    fn payment_never_overdraws() {
        assert!(Entry::payment(
            user::Id::new(),
            Money::from_rupiah(100_000),
            Money::from_rupiah(105_000),
            booking::Id::new(),
        )
        .is_none());
    }
}
