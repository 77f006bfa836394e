//! Handling service prices and their aggregation into a [`Quote`].

use std::collections::HashMap;

use common::{define_kind, Money};

use crate::domain::{booking, discount, travel, Discount};

define_kind! {
    #[doc = "Key of a [`ServicePrice`] in a [`PriceTable`]."]
    enum PriceKey {
        #[doc = "Arrival handling alone."]
        #[label = "Arrival"]
        Arrival = 1,

        #[doc = "Departure handling alone."]
        #[label = "Departure"]
        Departure = 2,

        #[doc = "Transit handling."]
        #[label = "Transit"]
        Transit = 3,

        #[doc = "Combined rate of arrival and departure handling."]
        #[label = "Arrival + Departure"]
        ArrivalDeparture = 4,
    }
}

/// Catalog category [`ServicePrice`]s are listed under.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Category(&'static str);

impl Category {
    /// Prices of handling passengers booked by agents.
    pub const AGENT_GROUP: Self = Self("Agent Group");

    /// Returns the catalog name of this [`Category`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

/// Price of a handling service per passenger.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ServicePrice {
    /// Price per passenger.
    pub sell_price: Money,

    /// Surcharge per additional baggage item.
    pub additional_price: Money,
}

/// [`ServicePrice`]s by their [`PriceKey`]s.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PriceTable(HashMap<PriceKey, ServicePrice>);

impl PriceTable {
    /// Creates a new [`PriceTable`] out of the provided entries.
    #[must_use]
    pub fn new(
        entries: impl IntoIterator<Item = (PriceKey, ServicePrice)>,
    ) -> Self {
        Self(entries.into_iter().collect())
    }

    /// Returns the [`PriceTable`] to quote with when the catalog cannot be
    /// reached.
    #[must_use]
    pub fn fallback() -> Self {
        let price = |sell| ServicePrice {
            sell_price: Money::from_rupiah(sell),
            additional_price: Money::ZERO,
        };
        Self::new([
            (PriceKey::Arrival, price(25_000)),
            (PriceKey::Departure, price(25_000)),
            (PriceKey::Transit, price(50_000)),
        ])
    }

    /// Returns the [`ServicePrice`] listed under the provided [`PriceKey`].
    #[must_use]
    pub fn get(&self, key: PriceKey) -> Option<&ServicePrice> {
        self.0.get(&key)
    }

    /// Indicates whether nothing is listed in this [`PriceTable`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the listed [`ServicePrice`]s in [`PriceKey`] order.
    pub fn iter(&self) -> impl Iterator<Item = (PriceKey, ServicePrice)> + '_ {
        PriceKey::ALL
            .iter()
            .filter_map(|key| self.0.get(key).map(|price| (*key, *price)))
    }

    /// Returns the price per passenger of the provided [`travel::Selection`].
    ///
    /// Unlisted keys count as zero.
    #[must_use]
    pub fn unit_price(&self, selection: &travel::Selection) -> Money {
        self.sum(selection, |p| p.sell_price)
    }

    /// Returns the surcharge per additional baggage item of the provided
    /// [`travel::Selection`].
    ///
    /// Unlisted keys count as zero.
    #[must_use]
    pub fn baggage_price(&self, selection: &travel::Selection) -> Money {
        self.sum(selection, |p| p.additional_price)
    }

    /// Sums the `field` of every [`ServicePrice`] pricing the `selection`.
    fn sum(
        &self,
        selection: &travel::Selection,
        field: impl Fn(&ServicePrice) -> Money,
    ) -> Money {
        selection
            .price_keys()
            .into_iter()
            .map(|key| self.0.get(&key).map_or(Money::ZERO, &field))
            .sum()
    }

    /// Prices the provided [`Order`] before any discount.
    #[must_use]
    pub fn subtotal(&self, order: &Order) -> Money {
        let passengers = self.unit_price(&order.selection)
            * u32::from(order.passengers.get());
        if order.baggage == 0 {
            return passengers;
        }
        passengers
            + self.baggage_price(&order.selection) * u32::from(order.baggage)
    }

    /// Prices the provided [`Order`], applying the provided [`Discount`], if
    /// any.
    #[must_use]
    pub fn quote(&self, order: &Order, discount: Option<&Discount>) -> Quote {
        let subtotal = self.subtotal(order);
        let applied = discount.map_or(
            discount::Applied::none(subtotal),
            |d| d.apply(subtotal, order.passengers),
        );
        Quote {
            unit_price: self.unit_price(&order.selection),
            baggage_price: self.baggage_price(&order.selection),
            subtotal: applied.subtotal,
            discount: applied.discount,
            total: applied.total,
        }
    }
}

/// What is being priced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Order {
    /// Number of passengers.
    pub passengers: booking::Passengers,

    /// Selected travel types.
    pub selection: travel::Selection,

    /// Number of additional baggage items.
    pub baggage: booking::BaggageCount,
}

/// Price breakdown of an [`Order`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Quote {
    /// Price per passenger.
    pub unit_price: Money,

    /// Surcharge per additional baggage item.
    pub baggage_price: Money,

    /// Price before the discount.
    pub subtotal: Money,

    /// Discount granted.
    pub discount: Money,

    /// Price to pay.
    pub total: Money,
}

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::domain::{
        booking::Passengers,
        travel::{Selection, Type},
    };

    use super::{Order, PriceKey, PriceTable, ServicePrice};

    #[test]
    fn keys_have_textual_form() {
        assert_eq!(PriceKey::ArrivalDeparture.to_string(), "ARRIVAL_DEPARTURE");
        assert_eq!(
            "TRANSIT".parse::<PriceKey>().unwrap(),
            PriceKey::Transit,
        );
        assert!("transit_only".parse::<PriceKey>().is_err());
    }

    fn table() -> PriceTable {
        let price = |sell, additional| ServicePrice {
            sell_price: Money::from_rupiah(sell),
            additional_price: Money::from_rupiah(additional),
        };
        PriceTable::new([
            (PriceKey::Arrival, price(25_000, 5_000)),
            (PriceKey::Departure, price(25_000, 5_000)),
            (PriceKey::Transit, price(50_000, 7_500)),
            (PriceKey::ArrivalDeparture, price(45_000, 8_000)),
        ])
    }

    fn order(passengers: u16, types: &[Type], baggage: u16) -> Order {
        Order {
            passengers: Passengers::new(passengers).unwrap(),
            selection: Selection::of(types.iter().copied()),
            baggage,
        }
    }

    #[test]
    fn combined_rate_takes_precedence() {
        let o = order(3, &[Type::Arrival, Type::Departure], 0);

        assert_eq!(table().unit_price(&o.selection), Money::from_rupiah(45_000));
        assert_eq!(table().subtotal(&o), Money::from_rupiah(135_000));
    }

    #[test]
    fn single_type_uses_its_price() {
        let o = order(5, &[Type::Transit], 0);
        assert_eq!(table().subtotal(&o), Money::from_rupiah(250_000));

        let o = order(2, &[Type::Departure], 0);
        assert_eq!(table().subtotal(&o), Money::from_rupiah(50_000));
    }

    #[test]
    fn missing_prices_count_as_zero() {
        let table = PriceTable::new([]);
        let o = order(3, &[Type::Arrival, Type::Departure], 4);

        assert_eq!(table.subtotal(&o), Money::ZERO);
    }

    #[test]
    fn adds_baggage_surcharge() {
        let o = order(3, &[Type::Arrival, Type::Departure], 2);

        assert_eq!(table().subtotal(&o), Money::from_rupiah(151_000));
    }

    #[test]
    fn fallback_prices() {
        let table = PriceTable::fallback();
        let o = order(1, &[Type::Arrival, Type::Departure], 3);

        assert_eq!(table.get(PriceKey::Transit).unwrap().sell_price.to_string(), "50000IDR");
        assert!(table.get(PriceKey::ArrivalDeparture).is_none());
        assert_eq!(table.subtotal(&o), Money::ZERO);
    }
}
