//! [`Booking`] definitions.

pub mod draft;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, Date, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::User;
use crate::domain::{payment, pricing, travel, user};

pub use self::draft::Draft;

/// Handling service booked by an agent [`User`] for a group of travelers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// ID of the agent [`User`] who made this [`Booking`].
    pub user_id: user::Id,

    /// What has been booked.
    pub details: Details,

    /// Price breakdown of this [`Booking`].
    pub price: pricing::Quote,

    /// [`payment::Method`] chosen for this [`Booking`].
    pub payment_method: payment::Method,

    /// [`payment::Bank`] chosen for a [`payment::Method::BankTransfer`].
    pub bank: Option<payment::Bank>,

    /// [`payment::Status`] of this [`Booking`].
    pub payment_status: payment::Status,

    /// [`Status`] of this [`Booking`].
    pub status: Status,

    /// [`DateTime`] when this [`Booking`] was made.
    pub created_at: CreationDateTime,
}

/// Validated contents of a [`Draft`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Details {
    /// Number of passengers.
    pub passengers: Passengers,

    /// Selected travel types.
    pub selection: travel::Selection,

    /// Number of additional baggage items.
    pub baggage: BaggageCount,

    /// Where travelers are picked up, if required by the `selection`.
    pub pickup_area: Option<travel::Area>,

    /// Where travelers are dropped off, if required by the `selection`.
    pub dropoff_area: Option<travel::Area>,

    /// Name of the traveler in charge of the group.
    pub customer_name: CustomerName,

    /// Phone of the traveler in charge of the group.
    pub customer_phone: user::Phone,

    /// Flight of the group, if known.
    pub flight_number: Option<FlightNumber>,

    /// [`Date`] of the flight.
    pub flight_date: Date,

    /// Free-form remarks for the handling crew.
    pub notes: Option<Notes>,
}

impl Details {
    /// Returns the [`pricing::Order`] of these [`Details`].
    #[must_use]
    pub fn order(&self) -> pricing::Order {
        pricing::Order {
            passengers: self.passengers,
            selection: self.selection,
            baggage: self.baggage,
        }
    }
}

/// ID of a [`Booking`].
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
    #[doc = "Status of a [`Booking`]."]
    enum Status {
        #[doc = "Awaiting confirmation by an operator."]
        #[label = "Pending"]
        Pending = 1,

        #[doc = "Confirmed by an operator."]
        #[label = "Confirmed"]
        Confirmed = 2,

        #[doc = "Handling has been provided."]
        #[label = "Completed"]
        Completed = 3,

        #[doc = "Won't be provided."]
        #[label = "Cancelled"]
        Cancelled = 4,
    }
}

impl Status {
    /// Indicates whether this [`Status`] is final.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Indicates whether a [`Booking`] in this [`Status`] may move to the
    /// `next` one.
    #[must_use]
    pub fn can_become(self, next: Self) -> bool {
        !self.is_terminal() && next != self && next != Self::Pending
    }
}

/// Number of passengers in a [`Booking`], from 1 to 200.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Passengers(u16);

impl Passengers {
    /// Maximum number of passengers in a single [`Booking`].
    pub const MAX: u16 = 200;

    /// Creates new [`Passengers`] if `count` is within `1..=`[`MAX`].
    ///
    /// [`MAX`]: Self::MAX
    #[must_use]
    pub fn new(count: u16) -> Option<Self> {
        (1..=Self::MAX).contains(&count).then_some(Self(count))
    }

    /// Returns the number of passengers.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

/// Number of additional baggage items in a [`Booking`].
pub type BaggageCount = u16;

/// Name of the traveler in charge of a [`Booking`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct CustomerName(String);

impl CustomerName {
    /// Creates a new [`CustomerName`] if the given `name` is trimmed,
    /// non-empty and at most 128 characters long.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        (name.trim() == name && !name.is_empty() && name.chars().count() <= 128)
            .then_some(Self(name))
    }
}

impl FromStr for CustomerName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `CustomerName`")
    }
}

/// IATA flight number, e.g. `GA 410` or `QZ7510`.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct FlightNumber(String);

impl FlightNumber {
    /// Creates a new [`FlightNumber`] if the given `number` is an airline
    /// designator followed by up to 4 digits and an optional suffix letter.
    ///
    /// The number is uppercased and the separating space is dropped.
    #[must_use]
    pub fn new(number: impl AsRef<str>) -> Option<Self> {
        let number = number.as_ref().trim().to_uppercase().replace(' ', "");
        let designator = number.get(..2)?;
        let rest = number.get(2..)?;
        let digits = rest.trim_end_matches(|c: char| c.is_ascii_uppercase());

        (designator.chars().all(|c| c.is_ascii_alphanumeric())
            && designator.chars().any(|c| c.is_ascii_uppercase())
            && (1..=4).contains(&digits.len())
            && digits.chars().all(|c| c.is_ascii_digit())
            && rest.len() - digits.len() <= 1)
            .then_some(Self(number))
    }
}

impl FromStr for FlightNumber {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `FlightNumber`")
    }
}

/// Remarks on a [`Booking`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Notes(String);

impl Notes {
    /// Creates new [`Notes`] if the given `notes` are non-blank and at most
    /// 1000 characters long.
    #[must_use]
    pub fn new(notes: impl Into<String>) -> Option<Self> {
        let notes = notes.into();
        (!notes.trim().is_empty() && notes.chars().count() <= 1000)
            .then_some(Self(notes))
    }
}

impl FromStr for Notes {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Notes`")
    }
}

/// [`DateTime`] when a [`Booking`] was made.
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{FlightNumber, Passengers, Status};

    #[test]
    fn passengers_bounds() {
        assert!(Passengers::new(0).is_none());
        assert!(Passengers::new(1).is_some());
        assert!(Passengers::new(200).is_some());
        assert!(Passengers::new(201).is_none());
    }

    #[test]
    fn flight_number_is_normalized() {
        assert_eq!(FlightNumber::new("ga 410").unwrap().to_string(), "GA410");
        assert_eq!(FlightNumber::new("QZ7510").unwrap().to_string(), "QZ7510");
        assert_eq!(FlightNumber::new("8B 123A").unwrap().to_string(), "8B123A");

        assert!(FlightNumber::new("GA").is_none());
        assert!(FlightNumber::new("GA12345").is_none());
        assert!(FlightNumber::new("12 345").is_none());
    }

    #[test]
    fn terminal_statuses() {
        assert!(Status::Pending.can_become(Status::Confirmed));
        assert!(Status::Confirmed.can_become(Status::Completed));
        assert!(Status::Pending.can_become(Status::Cancelled));

        assert!(!Status::Confirmed.can_become(Status::Pending));
        assert!(!Status::Confirmed.can_become(Status::Confirmed));
        assert!(!Status::Cancelled.can_become(Status::Confirmed));
        assert!(!Status::Completed.can_become(Status::Cancelled));
    }
}
