//! [`Discount`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, Into};
use juniper::{graphql_object, GraphQLInputObject, GraphQLScalar};
use rust_decimal::Decimal;
use service::domain;

use crate::{api, Context};

/// Discount granted to an agent `User`.
#[derive(Clone, Debug)]
pub struct Discount(domain::Discount);

impl From<domain::Discount> for Discount {
    fn from(discount: domain::Discount) -> Self {
        Self(discount)
    }
}

/// Discount granted to an agent `User`.
#[graphql_object(context = Context)]
impl Discount {
    /// Agent `User` this `Discount` is granted to.
    #[must_use]
    pub fn agent(&self) -> api::User {
        #[expect(unsafe_code, reason = "`Discount` references existing `User`")]
        unsafe {
            api::User::new_unchecked(self.0.user_id)
        }
    }

    /// `DiscountKind` of this `Discount`.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.0.kind.into()
    }

    /// Amount off per unit of the `DiscountKind`.
    #[must_use]
    pub fn value(&self) -> Value {
        Value(self.0.value.get())
    }

    /// Indicator whether this `Discount` is applied to new `Booking`s.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.0.is_active
    }

    /// `DateTime` when this `Discount` was last saved.
    #[must_use]
    pub fn updated_at(&self) -> DateTime {
        self.0.updated_at.coerce()
    }
}

define_enum! {
    #[doc = "Kind of a `Discount`."]
    #[graphql(name = "DiscountKind")]
    enum Kind = domain::discount::Kind {
        #[doc = "Flat amount off per passenger."]
        FlatPerPassenger,
    }
}

/// Non-negative decimal amount of a `Discount`, e.g. `5000` or `2500.5`.
///
/// Fractions are floored when the `Discount` is applied.
#[derive(AsRef, Clone, Copy, Debug, Display, GraphQLScalar, Into)]
#[graphql(name = "DiscountValue", with = api::scalar::Via::<Decimal>)]
pub struct Value(Decimal);

impl TryFrom<Decimal> for Value {
    type Error = &'static str;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        domain::discount::Value::new(value)
            .map(|v| Self(v.get()))
            .ok_or("must not be negative")
    }
}

impl From<Value> for domain::discount::Value {
    fn from(Value(value): Value) -> Self {
        // Checked on input.
        Self::new(value).unwrap_or_default()
    }
}

/// `Discount` to save onto an agent `User`.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "DiscountInput")]
pub struct Input {
    /// ID of the agent `User` to grant the `Discount` to.
    pub agent_id: api::user::Id,

    /// Amount off per passenger.
    pub value: Value,

    /// Indicator whether the `Discount` is applied to new `Booking`s.
    pub is_active: bool,

    /// Subtotal of the order the `DiscountSnapshot` is computed against.
    pub reference_subtotal: common::Money,

    /// Passengers of the order the `DiscountSnapshot` is computed against.
    pub reference_passengers: i32,
}
