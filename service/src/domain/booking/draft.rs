//! [`Draft`] of a [`Booking`] being filled in.

use std::fmt;

use common::Date;
use derive_more::{Display, Error};
use itertools::Itertools as _;
use smart_default::SmartDefault;

#[cfg(doc)]
use crate::domain::Booking;
use crate::domain::{travel, user};

use super::{CustomerName, Details, FlightNumber, Notes, Passengers};

/// Unvalidated [`Booking`] contents, as entered in the booking wizard.
#[derive(Clone, Debug, SmartDefault)]
pub struct Draft {
    /// Number of passengers.
    #[default = 1]
    pub passengers: u16,

    /// Selected travel types.
    selection: travel::Selection,

    /// Number of additional baggage items.
    pub baggage: u16,

    /// Pickup area, if entered.
    pickup_area: Option<String>,

    /// Dropoff area, if entered.
    dropoff_area: Option<String>,

    /// Name of the traveler in charge of the group.
    pub customer_name: String,

    /// Phone of the traveler in charge of the group.
    pub customer_phone: String,

    /// Flight number, if entered.
    pub flight_number: Option<String>,

    /// Date of the flight, if entered.
    pub flight_date: Option<Date>,

    /// Remarks, if entered.
    pub notes: Option<String>,
}

impl Draft {
    /// Returns the selected travel types.
    #[must_use]
    pub const fn selection(&self) -> travel::Selection {
        self.selection
    }

    /// Returns the entered pickup area, if any.
    #[must_use]
    pub fn pickup_area(&self) -> Option<&str> {
        self.pickup_area.as_deref()
    }

    /// Returns the entered dropoff area, if any.
    #[must_use]
    pub fn dropoff_area(&self) -> Option<&str> {
        self.dropoff_area.as_deref()
    }

    /// Selects the provided [`travel::Type`].
    ///
    /// Areas no longer required afterwards are cleared, and selecting
    /// [`travel::Type::Transit`] always clears both.
    pub fn select_travel(&mut self, ty: travel::Type) {
        self.selection = self.selection.select(ty);
        if ty == travel::Type::Transit {
            self.pickup_area = None;
            self.dropoff_area = None;
        }
        self.clear_unused_areas();
    }

    /// Deselects the provided [`travel::Type`], clearing areas no longer
    /// required.
    pub fn deselect_travel(&mut self, ty: travel::Type) {
        self.selection = self.selection.deselect(ty);
        self.clear_unused_areas();
    }

    /// Enters the pickup area.
    ///
    /// Ignored unless the current selection requires one.
    pub fn set_pickup_area(&mut self, area: impl Into<String>) {
        if self.selection.requires_pickup() {
            self.pickup_area = Some(area.into());
        }
    }

    /// Enters the dropoff area.
    ///
    /// Ignored unless the current selection requires one.
    pub fn set_dropoff_area(&mut self, area: impl Into<String>) {
        if self.selection.requires_dropoff() {
            self.dropoff_area = Some(area.into());
        }
    }

    /// Clears areas the current selection doesn't require.
    fn clear_unused_areas(&mut self) {
        if !self.selection.requires_pickup() {
            self.pickup_area = None;
        }
        if !self.selection.requires_dropoff() {
            self.dropoff_area = None;
        }
    }

    /// Validates this [`Draft`], reporting every invalid [`Field`] at once.
    ///
    /// # Errors
    ///
    /// If any [`Field`] is missing or malformed.
    pub fn validate(&self) -> Result<Details, Invalid> {
        /// Records the [`Reason`] of the `field`, if any.
        fn check<T>(
            errors: &mut Vec<(Field, Reason)>,
            field: Field,
            res: Result<T, Reason>,
        ) -> Option<T> {
            res.map_err(|reason| errors.push((field, reason))).ok()
        }

        let mut errors = Vec::new();
        let passengers = check(
            &mut errors,
            Field::Passengers,
            Passengers::new(self.passengers).ok_or(Reason::OutOfRange),
        );
        let selection = check(
            &mut errors,
            Field::TravelTypes,
            (!self.selection.is_empty())
                .then_some(self.selection)
                .ok_or(Reason::Required),
        );
        let pickup_area = check(
            &mut errors,
            Field::PickupArea,
            area(self.pickup_area(), self.selection.requires_pickup()),
        );
        let dropoff_area = check(
            &mut errors,
            Field::DropoffArea,
            area(self.dropoff_area(), self.selection.requires_dropoff()),
        );
        let customer_name = check(
            &mut errors,
            Field::CustomerName,
            required(&self.customer_name).and_then(|n| {
                CustomerName::new(n.trim()).ok_or(Reason::Invalid)
            }),
        );
        let customer_phone = check(
            &mut errors,
            Field::CustomerPhone,
            required(&self.customer_phone).and_then(|p| {
                user::Phone::new(p.trim()).ok_or(Reason::Invalid)
            }),
        );
        let flight_number = check(
            &mut errors,
            Field::FlightNumber,
            self.flight_number
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .map(|n| FlightNumber::new(n).ok_or(Reason::Invalid))
                .transpose(),
        );
        let flight_date = check(
            &mut errors,
            Field::FlightDate,
            self.flight_date.ok_or(Reason::Required),
        );
        let notes = check(
            &mut errors,
            Field::Notes,
            self.notes
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .map(|n| Notes::new(n).ok_or(Reason::Invalid))
                .transpose(),
        );

        match (
            passengers,
            selection,
            pickup_area,
            dropoff_area,
            customer_name,
            customer_phone,
            flight_number,
            flight_date,
            notes,
        ) {
            (
                Some(passengers),
                Some(selection),
                Some(pickup_area),
                Some(dropoff_area),
                Some(customer_name),
                Some(customer_phone),
                Some(flight_number),
                Some(flight_date),
                Some(notes),
            ) if errors.is_empty() => Ok(Details {
                passengers,
                selection,
                baggage: self.baggage,
                pickup_area,
                dropoff_area,
                customer_name,
                customer_phone,
                flight_number,
                flight_date,
                notes,
            }),
            _ => Err(Invalid(errors)),
        }
    }
}

/// Checks the provided raw `value` is non-blank.
fn required(value: &str) -> Result<&str, Reason> {
    if value.trim().is_empty() {
        Err(Reason::Required)
    } else {
        Ok(value)
    }
}

/// Parses an optional area, required or not.
fn area(
    value: Option<&str>,
    is_required: bool,
) -> Result<Option<travel::Area>, Reason> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None if is_required => Err(Reason::Required),
        None => Ok(None),
        Some(v) => travel::Area::new(v).map(Some).ok_or(Reason::Invalid),
    }
}

/// Field of a [`Draft`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Field {
    /// [`Draft::passengers`].
    #[display("passengers")]
    Passengers,

    /// [`Draft::selection()`].
    #[display("travelTypes")]
    TravelTypes,

    /// [`Draft::pickup_area()`].
    #[display("pickupArea")]
    PickupArea,

    /// [`Draft::dropoff_area()`].
    #[display("dropoffArea")]
    DropoffArea,

    /// [`Draft::customer_name`].
    #[display("customerName")]
    CustomerName,

    /// [`Draft::customer_phone`].
    #[display("customerPhone")]
    CustomerPhone,

    /// [`Draft::flight_number`].
    #[display("flightNumber")]
    FlightNumber,

    /// [`Draft::flight_date`].
    #[display("flightDate")]
    FlightDate,

    /// [`Draft::notes`].
    #[display("notes")]
    Notes,
}

/// Why a [`Field`] is invalid.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Reason {
    /// Nothing entered while required.
    #[display("required")]
    Required,

    /// Entered value is malformed.
    #[display("invalid")]
    Invalid,

    /// Entered number is out of the allowed range.
    #[display("out of range")]
    OutOfRange,
}

/// Error of [`Draft::validate()`] listing every invalid [`Field`].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub struct Invalid(#[error(not(source))] pub Vec<(Field, Reason)>);

impl fmt::Display for Invalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid booking: {}",
            self.0
                .iter()
                .format_with(", ", |(field, reason), f| f(&format_args!(
                    "{field} is {reason}"
                ))),
        )
    }
}

impl Invalid {
    /// Returns the [`Reason`] the provided [`Field`] is invalid, if it is.
    #[must_use]
    pub fn reason(&self, field: Field) -> Option<Reason> {
        self.0.iter().find(|(f, _)| *f == field).map(|(_, r)| *r)
    }
}

#[cfg(test)]
mod spec {
    use common::Date;

    use crate::domain::travel::Type;

    use super::{Draft, Field, Reason};

    fn filled() -> Draft {
        let mut draft = Draft {
            passengers: 3,
            customer_name: "Siti Rahayu".into(),
            customer_phone: "0812-3456-7890".into(),
            flight_number: Some("ga 410".into()),
            flight_date: Date::from_ymd(2026, 11, 2),
            ..Draft::default()
        };
        draft.select_travel(Type::Arrival);
        draft.select_travel(Type::Departure);
        draft.set_pickup_area("Terminal 3");
        draft.set_dropoff_area("Hotel Mulia");
        draft
    }

    #[test]
    fn validates_filled_draft() {
        let details = filled().validate().unwrap();

        assert_eq!(details.passengers.get(), 3);
        assert_eq!(details.flight_number.unwrap().to_string(), "GA410");
        assert_eq!(details.pickup_area.unwrap().to_string(), "Terminal 3");
    }

    #[test]
    fn transit_clears_areas() {
        let mut draft = filled();

        draft.select_travel(Type::Transit);

        assert_eq!(draft.pickup_area(), None);
        assert_eq!(draft.dropoff_area(), None);
        let err = draft.validate().unwrap_err();
        assert_eq!(err.reason(Field::PickupArea), Some(Reason::Required));
        assert_eq!(err.reason(Field::DropoffArea), Some(Reason::Required));
    }

    #[test]
    fn deselect_clears_unrequired_area() {
        let mut draft = filled();

        draft.deselect_travel(Type::Departure);

        assert_eq!(draft.pickup_area(), Some("Terminal 3"));
        assert_eq!(draft.dropoff_area(), None);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn ignores_unrequired_area() {
        let mut draft = Draft::default();
        draft.select_travel(Type::Arrival);

        draft.set_dropoff_area("Hotel Mulia");

        assert_eq!(draft.dropoff_area(), None);
    }

    #[test]
    fn reports_every_invalid_field() {
        let draft = Draft {
            passengers: 0,
            customer_phone: "12345".into(),
            ..Draft::default()
        };

        let err = draft.validate().unwrap_err();

        assert_eq!(err.reason(Field::Passengers), Some(Reason::OutOfRange));
        assert_eq!(err.reason(Field::TravelTypes), Some(Reason::Required));
        assert_eq!(err.reason(Field::CustomerName), Some(Reason::Required));
        assert_eq!(err.reason(Field::CustomerPhone), Some(Reason::Invalid));
        assert_eq!(err.reason(Field::FlightDate), Some(Reason::Required));
        assert_eq!(err.reason(Field::PickupArea), None);
        assert_eq!(err.reason(Field::Notes), None);
    }

    #[test]
    fn passenger_limit() {
        let mut draft = filled();
        draft.passengers = 201;

        let err = draft.validate().unwrap_err();

        assert_eq!(err.0, [(Field::Passengers, Reason::OutOfRange)]);
    }
}
