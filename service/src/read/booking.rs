//! [`Booking`] read model definition.
//!
//! [`Booking`]: crate::domain::Booking

pub mod list {
    //! [`Booking`]s list definitions.

    use common::{define_pagination, Date};
    use derive_more::{From, Into};

    #[cfg(doc)]
    use crate::domain::User;
    use crate::domain::{booking, payment, travel, user, Booking};

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = booking::Id;

    /// Cursor pointing to a specific [`Booking`] in a list.
    ///
    /// [`booking::Id`]s are time-ordered, so the list goes from the oldest
    /// [`Booking`] to the newest one.
    pub type Cursor = booking::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// ID of the agent [`User`] who made the [`Booking`]s.
        pub user_id: Option<user::Id>,

        /// [`booking::Status`]es to include. Empty means all.
        pub statuses: Vec<booking::Status>,

        /// [`payment::Status`]es to include. Empty means all.
        pub payment_statuses: Vec<payment::Status>,

        /// [`travel::Type`] the [`Booking`]s must include.
        pub travel_type: Option<travel::Type>,

        /// [`booking::CustomerName`] (or its part) to fuzzy search for.
        pub customer_name: Option<booking::CustomerName>,

        /// First [`Date`] of creation to include.
        pub created_from: Option<Date>,

        /// Last [`Date`] of creation to include.
        pub created_to: Option<Date>,
    }

    impl Filter {
        /// Indicates whether the provided [`Booking`] passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, booking: &Booking) -> bool {
            let created = booking.created_at.date();
            self.user_id.map_or(true, |id| booking.user_id == id)
                && (self.statuses.is_empty()
                    || self.statuses.contains(&booking.status))
                && (self.payment_statuses.is_empty()
                    || self.payment_statuses.contains(&booking.payment_status))
                && self
                    .travel_type
                    .map_or(true, |t| booking.details.selection.contains(t))
                && self.customer_name.as_ref().map_or(true, |name| {
                    let customer =
                        booking.details.customer_name.to_string().to_lowercase();
                    name.to_string()
                        .to_lowercase()
                        .split_whitespace()
                        .any(|word| customer.contains(word))
                })
                && self.created_from.map_or(true, |from| created >= from)
                && self.created_to.map_or(true, |to| created <= to)
        }
    }

    /// Total count of [`Booking`]s.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);

    #[cfg(test)]
    mod spec {
        use common::{Date, DateTime, Money};

        use crate::domain::{
            booking::{self, CustomerName, Details, Passengers},
            payment, pricing,
            travel::{Selection, Type},
            user, Booking,
        };

        use super::Filter;

        fn booking(name: &str, types: &[Type]) -> Booking {
            let quote = pricing::Quote {
                unit_price: Money::ZERO,
                baggage_price: Money::ZERO,
                subtotal: Money::ZERO,
                discount: Money::ZERO,
                total: Money::ZERO,
            };
            Booking {
                id: booking::Id::new(),
                user_id: user::Id::new(),
                details: Details {
                    passengers: Passengers::new(2).unwrap(),
                    selection: Selection::of(types.iter().copied()),
                    baggage: 0,
                    pickup_area: None,
                    dropoff_area: None,
                    customer_name: CustomerName::new(name).unwrap(),
                    customer_phone: user::Phone::new("081234567890").unwrap(),
                    flight_number: None,
                    flight_date: Date::from_ymd(2026, 11, 2).unwrap(),
                    notes: None,
                },
                price: quote,
                payment_method: payment::Method::Cash,
                bank: None,
                payment_status: payment::Status::Pending,
                status: booking::Status::Pending,
                created_at: DateTime::now().coerce(),
            }
        }

        #[test]
        fn empty_filter_matches_everything() {
            assert!(Filter::default().matches(&booking("Siti", &[Type::Transit])));
        }

        #[test]
        fn matches_customer_name_case_insensitively() {
            let filter = Filter {
                customer_name: CustomerName::new("siti"),
                ..Filter::default()
            };

            assert!(filter.matches(&booking("Ibu Siti Aminah", &[Type::Arrival])));
            assert!(!filter.matches(&booking("Budi", &[Type::Arrival])));
        }

        #[test]
        fn matches_customer_name_by_any_word() {
            let filter = Filter {
                customer_name: CustomerName::new("Budi Santoso"),
                ..Filter::default()
            };

            assert!(filter.matches(&booking("Budi", &[Type::Arrival])));
            assert!(filter.matches(&booking("Agus Santoso", &[Type::Arrival])));
            assert!(!filter.matches(&booking("Siti", &[Type::Arrival])));
        }

        #[test]
        fn matches_travel_type_and_status() {
            let b = booking("Siti", &[Type::Arrival, Type::Departure]);

            let by_type = Filter {
                travel_type: Some(Type::Departure),
                ..Filter::default()
            };
            assert!(by_type.matches(&b));

            let by_status = Filter {
                statuses: vec![booking::Status::Cancelled],
                ..Filter::default()
            };
            assert!(!by_status.matches(&b));
        }
    }
}
