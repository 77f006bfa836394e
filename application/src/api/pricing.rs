//! Pricing-related definitions.

use common::Money;
use juniper::GraphQLObject;
use service::{domain, query};

use crate::Context;

define_enum! {
    #[doc = "Key a `ServicePrice` is listed under."]
    #[graphql(name = "PriceKey")]
    enum PriceKey = domain::pricing::PriceKey {
        #[doc = "`ARRIVAL` handling alone."]
        Arrival,

        #[doc = "`DEPARTURE` handling alone."]
        Departure,

        #[doc = "`TRANSIT` handling."]
        Transit,

        #[doc = "Combined rate of `ARRIVAL` and `DEPARTURE` handling."]
        ArrivalDeparture,
    }
}

/// Price of a handling service per passenger.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct ServicePrice {
    /// `PriceKey` this price is listed under.
    pub key: PriceKey,

    /// Human-readable name of the priced service.
    pub label: String,

    /// Price per passenger.
    pub sell_price: Money,

    /// Surcharge per additional baggage item.
    pub additional_price: Money,
}

impl From<(domain::pricing::PriceKey, domain::pricing::ServicePrice)>
    for ServicePrice
{
    fn from(
        (key, price): (
            domain::pricing::PriceKey,
            domain::pricing::ServicePrice,
        ),
    ) -> Self {
        Self {
            key: key.into(),
            label: key.label().to_owned(),
            sell_price: price.sell_price,
            additional_price: price.additional_price,
        }
    }
}

/// Price breakdown of an order.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct Quote {
    /// Price per passenger.
    pub unit_price: Money,

    /// Surcharge per additional baggage item.
    pub baggage_price: Money,

    /// Price before the discount.
    pub subtotal: Money,

    /// Discount granted to the agent.
    pub discount: Money,

    /// Price to pay.
    pub total: Money,
}

impl From<domain::pricing::Quote> for Quote {
    fn from(quote: domain::pricing::Quote) -> Self {
        let domain::pricing::Quote {
            unit_price,
            baggage_price,
            subtotal,
            discount,
            total,
        } = quote;
        Self {
            unit_price,
            baggage_price,
            subtotal,
            discount,
            total,
        }
    }
}

/// Price of an order being filled in, along with the payment options it
/// leaves open.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct OrderQuote {
    /// Price breakdown.
    pub price: Quote,

    /// Indicates whether the wallet balance covers the `total`, so the
    /// `USE_SALDO` payment method may be selected.
    pub can_use_saldo: bool,
}

impl From<query::quote::Output> for OrderQuote {
    fn from(out: query::quote::Output) -> Self {
        Self {
            price: out.price.into(),
            can_use_saldo: out.can_use_saldo,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Money;
    use service::domain::pricing;

    use super::{PriceKey, ServicePrice};

    #[test]
    fn lists_price_with_label() {
        let price = ServicePrice::from((
            pricing::PriceKey::ArrivalDeparture,
            pricing::ServicePrice {
                sell_price: Money::from_rupiah(45_000),
                additional_price: Money::from_rupiah(8_000),
            },
        ));

        assert_eq!(price.key, PriceKey::ArrivalDeparture);
        assert_eq!(price.label, pricing::PriceKey::ArrivalDeparture.label());
        assert_eq!(price.clone().sell_price, Money::from_rupiah(45_000));
    }
}
