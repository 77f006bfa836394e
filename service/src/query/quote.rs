//! [`Quote`] [`Query`] definition.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{payment::Method, Discount};
use crate::{
    domain::{booking, discount, payment, pricing, travel, user, User},
    infra::{database, Database},
    Query, Service,
};

/// [`Query`] pricing an order of an agent [`User`] without booking it.
///
/// Also tells whether the [`User`] may pay it with [`Method::UseSaldo`].
#[derive(Clone, Copy, Debug)]
pub struct Quote {
    /// ID of the agent [`User`] whose [`Discount`] applies.
    pub user_id: user::Id,

    /// Number of passengers.
    pub passengers: booking::Passengers,

    /// Selected travel types.
    pub selection: travel::Selection,

    /// Number of additional baggage items.
    pub baggage: booking::BaggageCount,
}

/// Output of [`Quote`] [`Query`].
#[derive(Clone, Copy, Debug)]
pub struct Output {
    /// Price of the order.
    pub price: pricing::Quote,

    /// Indicates whether the wallet balance covers the price.
    pub can_use_saldo: bool,
}

impl<Db> Query<Quote> for Service<Db>
where
    Db: Database<
            Select<By<pricing::PriceTable, pricing::Category>>,
            Ok = pricing::PriceTable,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<discount::Discount>, user::Id>>,
            Ok = Option<discount::Discount>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: Quote) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Quote {
            user_id,
            passengers,
            selection,
            baggage,
        } = query;
        if selection.is_empty() {
            return Err(tracerr::new!(E::NoTravelType));
        }

        let user = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        let table = self.price_table().await;
        let discount = self
            .database()
            .execute(Select(By::<Option<discount::Discount>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let order = pricing::Order {
            passengers,
            selection,
            baggage,
        };
        let price = table.quote(&order, discount.as_ref());
        Ok(Output {
            price,
            can_use_saldo: payment::Gate::new(user.balance, price.total)
                .can_use_saldo(),
        })
    }
}

/// Error of [`Quote`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// No [`travel::Type`] selected.
    #[display("No travel type selected")]
    NoTravelType,

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, DateTime, Money};
    use rust_decimal::Decimal;

    use crate::{
        domain::{
            booking::Passengers,
            discount::{self, Discount},
            pricing::{PriceKey, PriceTable, ServicePrice},
            travel::{Selection, Type},
            user, User,
        },
        infra::database::mock::{self, Mock},
        Query as _,
    };

    use super::{ExecutionError, Quote};

    fn quote(user_id: user::Id, types: &[Type]) -> Quote {
        Quote {
            user_id,
            passengers: Passengers::new(3).unwrap(),
            selection: Selection::of(types.iter().copied()),
            baggage: 0,
        }
    }

    async fn setup(balance: u64) -> (Mock, User) {
        let db = Mock::default();
        let mut agent = mock::agent();
        agent.balance = Money::from_rupiah(balance);
        db.execute(Insert(agent.clone())).await.unwrap();
        db.execute(Insert(PriceTable::new([(
            PriceKey::ArrivalDeparture,
            ServicePrice {
                sell_price: Money::from_rupiah(45_000),
                additional_price: Money::ZERO,
            },
        )])))
        .await
        .unwrap();
        db.execute(Insert(Discount {
            user_id: agent.id,
            kind: discount::Kind::FlatPerPassenger,
            value: discount::Value::new(Decimal::from(10_000)).unwrap(),
            is_active: true,
            updated_at: DateTime::now().coerce(),
        }))
        .await
        .unwrap();
        (db, agent)
    }

    #[tokio::test]
    async fn applies_discount() {
        let (db, agent) = setup(0).await;

        let out = mock::service(db)
            .execute(quote(agent.id, &[Type::Arrival, Type::Departure]))
            .await
            .unwrap();

        assert_eq!(out.price.subtotal, Money::from_rupiah(135_000));
        assert_eq!(out.price.discount, Money::from_rupiah(30_000));
        assert_eq!(out.price.total, Money::from_rupiah(105_000));
    }

    #[tokio::test]
    async fn disables_saldo_when_balance_is_short() {
        let (db, agent) = setup(100_000).await;

        let out = mock::service(db)
            .execute(quote(agent.id, &[Type::Arrival, Type::Departure]))
            .await
            .unwrap();

        assert_eq!(out.price.total, Money::from_rupiah(105_000));
        assert!(!out.can_use_saldo);
    }

    #[tokio::test]
    async fn enables_saldo_when_balance_covers_total() {
        let (db, agent) = setup(105_000).await;

        let out = mock::service(db)
            .execute(quote(agent.id, &[Type::Arrival, Type::Departure]))
            .await
            .unwrap();

        assert!(out.can_use_saldo);
    }

    #[tokio::test]
    async fn requires_travel_type() {
        let (db, agent) = setup(0).await;

        let err = mock::service(db)
            .execute(quote(agent.id, &[]))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NoTravelType));
    }

    #[tokio::test]
    async fn fails_for_unknown_user() {
        let (db, _) = setup(0).await;

        let err = mock::service(db)
            .execute(quote(user::Id::new(), &[Type::Transit]))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UserNotExists(_)));
    }
}
