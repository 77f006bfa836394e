//! Travel [`Type`] definitions and the [`Selection`] of them in a booking.

use common::define_kind;
use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

use crate::domain::pricing::PriceKey;

define_kind! {
    #[doc = "Type of airport handling a traveler needs."]
    enum Type {
        #[doc = "Assistance on arrival."]
        #[label = "Arrival"]
        Arrival = 1,

        #[doc = "Assistance on departure."]
        #[label = "Departure"]
        Departure = 2,

        #[doc = "Assistance on a connecting flight."]
        #[label = "Transit"]
        Transit = 3,
    }
}

/// Set of travel [`Type`]s selected for a booking.
///
/// [`Type::Transit`] excludes both [`Type::Arrival`] and [`Type::Departure`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Selection {
    /// Nothing selected yet.
    #[default]
    None,

    /// Arrival, departure or both.
    ///
    /// At least one of the flags is always set.
    ArrivalAndOrDeparture {
        /// Whether [`Type::Arrival`] is selected.
        arrival: bool,

        /// Whether [`Type::Departure`] is selected.
        departure: bool,
    },

    /// Only [`Type::Transit`].
    TransitOnly,
}

impl Selection {
    /// Builds a [`Selection`] out of the provided [`Type`]s, applying them in
    /// order with [`Selection::select()`].
    #[must_use]
    pub fn of(types: impl IntoIterator<Item = Type>) -> Self {
        types.into_iter().fold(Self::None, Self::select)
    }

    /// Returns this [`Selection`] with the provided [`Type`] selected.
    #[must_use]
    pub fn select(self, ty: Type) -> Self {
        match (self, ty) {
            (_, Type::Transit) => Self::TransitOnly,
            (Self::None | Self::TransitOnly, Type::Arrival) => {
                Self::ArrivalAndOrDeparture {
                    arrival: true,
                    departure: false,
                }
            }
            (Self::None | Self::TransitOnly, Type::Departure) => {
                Self::ArrivalAndOrDeparture {
                    arrival: false,
                    departure: true,
                }
            }
            (Self::ArrivalAndOrDeparture { departure, .. }, Type::Arrival) => {
                Self::ArrivalAndOrDeparture {
                    arrival: true,
                    departure,
                }
            }
            (Self::ArrivalAndOrDeparture { arrival, .. }, Type::Departure) => {
                Self::ArrivalAndOrDeparture {
                    arrival,
                    departure: true,
                }
            }
        }
    }

    /// Returns this [`Selection`] with the provided [`Type`] deselected.
    #[must_use]
    pub fn deselect(self, ty: Type) -> Self {
        let (arrival, departure) = match (self, ty) {
            (Self::TransitOnly, Type::Transit) => return Self::None,
            (
                Self::ArrivalAndOrDeparture { departure, .. },
                Type::Arrival,
            ) => (false, departure),
            (
                Self::ArrivalAndOrDeparture { arrival, .. },
                Type::Departure,
            ) => (arrival, false),
            (
                Self::None,
                Type::Arrival | Type::Departure | Type::Transit,
            )
            | (Self::TransitOnly, Type::Arrival | Type::Departure)
            | (Self::ArrivalAndOrDeparture { .. }, Type::Transit) => {
                return self
            }
        };
        if arrival || departure {
            Self::ArrivalAndOrDeparture { arrival, departure }
        } else {
            Self::None
        }
    }

    /// Indicates whether the provided [`Type`] is selected.
    #[must_use]
    pub fn contains(&self, ty: Type) -> bool {
        match (*self, ty) {
            (Self::TransitOnly, Type::Transit) => true,
            (Self::ArrivalAndOrDeparture { arrival, .. }, Type::Arrival) => {
                arrival
            }
            (
                Self::ArrivalAndOrDeparture { departure, .. },
                Type::Departure,
            ) => departure,
            (
                Self::None,
                Type::Arrival | Type::Departure | Type::Transit,
            )
            | (Self::TransitOnly, Type::Arrival | Type::Departure)
            | (Self::ArrivalAndOrDeparture { .. }, Type::Transit) => false,
        }
    }

    /// Indicates whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::None
    }

    /// Returns the selected [`Type`]s in declaration order.
    pub fn types(&self) -> impl Iterator<Item = Type> + '_ {
        Type::ALL.iter().copied().filter(|ty| self.contains(*ty))
    }

    /// Indicates whether a pickup [`Area`] must be provided.
    #[must_use]
    pub fn requires_pickup(&self) -> bool {
        self.contains(Type::Arrival) || self.contains(Type::Transit)
    }

    /// Indicates whether a dropoff [`Area`] must be provided.
    #[must_use]
    pub fn requires_dropoff(&self) -> bool {
        self.contains(Type::Departure) || self.contains(Type::Transit)
    }

    /// Returns the [`PriceKey`]s to sum for pricing this [`Selection`].
    ///
    /// Arrival together with departure is priced by its own combined rate.
    #[must_use]
    pub fn price_keys(&self) -> Vec<PriceKey> {
        match *self {
            Self::None => vec![],
            Self::TransitOnly => vec![PriceKey::Transit],
            Self::ArrivalAndOrDeparture {
                arrival: true,
                departure: true,
            } => vec![PriceKey::ArrivalDeparture],
            Self::ArrivalAndOrDeparture { arrival, departure } => {
                let mut keys = vec![];
                if arrival {
                    keys.push(PriceKey::Arrival);
                }
                if departure {
                    keys.push(PriceKey::Departure);
                }
                keys
            }
        }
    }

    /// Returns the human-readable label of this [`Selection`], e.g.
    /// `Arrival + Departure`.
    #[must_use]
    pub fn label(&self) -> String {
        self.types().map(Type::label).collect::<Vec<_>>().join(" + ")
    }
}

/// Pickup or dropoff area of travelers, e.g. a terminal or a hotel.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Area(String);

impl Area {
    /// Creates a new [`Area`] if the given `area` is trimmed, non-empty and at
    /// most 256 characters long.
    #[must_use]
    pub fn new(area: impl Into<String>) -> Option<Self> {
        let area = area.into();
        (area.trim() == area && !area.is_empty() && area.chars().count() <= 256)
            .then_some(Self(area))
    }
}

impl std::str::FromStr for Area {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Area`")
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::pricing::PriceKey;

    use super::{Selection, Type};

    #[test]
    fn transit_replaces_everything() {
        for start in [
            Selection::None,
            Selection::of([Type::Arrival]),
            Selection::of([Type::Arrival, Type::Departure]),
            Selection::TransitOnly,
        ] {
            let s = start.select(Type::Transit);

            assert_eq!(s, Selection::TransitOnly);
            assert_eq!(s.types().collect::<Vec<_>>(), [Type::Transit]);
        }
    }

    #[test]
    fn arrival_replaces_transit() {
        let s = Selection::TransitOnly.select(Type::Arrival);

        assert_eq!(s.types().collect::<Vec<_>>(), [Type::Arrival]);
    }

    #[test]
    fn arrival_and_departure_unite() {
        let s = Selection::of([Type::Departure, Type::Arrival]);

        assert_eq!(
            s.types().collect::<Vec<_>>(),
            [Type::Arrival, Type::Departure],
        );
        assert_eq!(s.price_keys(), [PriceKey::ArrivalDeparture]);
        assert_eq!(s.label(), "Arrival + Departure");
    }

    #[test]
    fn deselects() {
        let s = Selection::of([Type::Arrival, Type::Departure]);

        let s = s.deselect(Type::Arrival);
        assert_eq!(s.types().collect::<Vec<_>>(), [Type::Departure]);
        assert!(!s.requires_pickup());
        assert!(s.requires_dropoff());

        let s = s.deselect(Type::Departure);
        assert!(s.is_empty());

        assert_eq!(
            Selection::TransitOnly.deselect(Type::Arrival),
            Selection::TransitOnly,
        );
        assert!(Selection::TransitOnly.deselect(Type::Transit).is_empty());
    }

    #[test]
    fn requires_areas() {
        let transit = Selection::of([Type::Transit]);
        assert!(transit.requires_pickup());
        assert!(transit.requires_dropoff());

        let arrival = Selection::of([Type::Arrival]);
        assert!(arrival.requires_pickup());
        assert!(!arrival.requires_dropoff());

        assert!(!Selection::None.requires_pickup());
        assert!(!Selection::None.requires_dropoff());
    }
}
