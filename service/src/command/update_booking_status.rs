//! [`Command`] for moving a [`Booking`] to another [`booking::Status`].

use common::operations::{By, Commit, Lock, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{booking, user, Booking, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for moving a [`Booking`] to another [`booking::Status`].
#[derive(Clone, Copy, Debug)]
pub struct UpdateBookingStatus {
    /// ID of the operator [`User`] updating the [`Booking`].
    pub operator_id: user::Id,

    /// ID of the [`Booking`] to update.
    pub booking_id: booking::Id,

    /// New [`booking::Status`].
    pub status: booking::Status,
}

impl<Db> Command<UpdateBookingStatus> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Booking, booking::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateBookingStatus,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateBookingStatus {
            operator_id,
            booking_id,
            status,
        } = cmd;

        let operator = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(operator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NotOperator(operator_id))
            .map_err(tracerr::wrap!())?;
        if !operator.is_operator() {
            return Err(tracerr::new!(E::NotOperator(operator_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Booking`.
        tx.execute(Lock(By::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        if !booking.status.can_become(status) {
            return Err(tracerr::new!(E::InvalidTransition {
                from: booking.status,
                to: status,
            }));
        }
        let from = booking.status;
        booking.status = status;
        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::info!(
            operator.id = %operator_id,
            booking.id = %booking_id,
            %from,
            to = %status,
            "booking status updated",
        );

        Ok(booking)
    }
}

/// Error of [`UpdateBookingStatus`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Booking`] doesn't exist.
    #[display("`Booking(id: {_0})` does not exist")]
    #[from(ignore)]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Booking`] cannot move to the requested [`booking::Status`].
    #[display("`Booking` cannot move from `{from}` to `{to}`")]
    #[from(ignore)]
    InvalidTransition {
        /// Current [`booking::Status`].
        from: booking::Status,

        /// Requested [`booking::Status`].
        to: booking::Status,
    },

    /// [`User`] is not an operator.
    #[display("`User(id: {_0})` is not an operator")]
    #[from(ignore)]
    NotOperator(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, Date, DateTime, Money};

    use crate::{
        domain::{
            booking::{self, CustomerName, Details, Passengers},
            payment, pricing,
            travel::{Selection, Type},
            user, Booking,
        },
        infra::database::mock::{self, Mock},
        Command as _,
    };

    use super::{ExecutionError, UpdateBookingStatus};

    fn booking(user_id: user::Id) -> Booking {
        Booking {
            id: booking::Id::new(),
            user_id,
            details: Details {
                passengers: Passengers::new(1).unwrap(),
                selection: Selection::of([Type::Transit]),
                baggage: 0,
                pickup_area: None,
                dropoff_area: None,
                customer_name: CustomerName::new("Siti").unwrap(),
                customer_phone: user::Phone::new("081234567890").unwrap(),
                flight_number: None,
                flight_date: Date::from_ymd(2026, 11, 2).unwrap(),
                notes: None,
            },
            price: pricing::Quote {
                unit_price: Money::from_rupiah(50_000),
                baggage_price: Money::ZERO,
                subtotal: Money::from_rupiah(50_000),
                discount: Money::ZERO,
                total: Money::from_rupiah(50_000),
            },
            payment_method: payment::Method::Cash,
            bank: None,
            payment_status: payment::Status::Pending,
            status: booking::Status::Pending,
            created_at: DateTime::now().coerce(),
        }
    }

    #[tokio::test]
    async fn moves_status_until_terminal() {
        let db = Mock::default();
        let (operator, agent) = (mock::operator(), mock::agent());
        db.execute(Insert(operator.clone())).await.unwrap();
        let b = booking(agent.id);
        db.execute(Insert(b.clone())).await.unwrap();
        let svc = mock::service(db);
        let update = |status| UpdateBookingStatus {
            operator_id: operator.id,
            booking_id: b.id,
            status,
        };

        let confirmed =
            svc.execute(update(booking::Status::Confirmed)).await.unwrap();
        assert_eq!(confirmed.status, booking::Status::Confirmed);

        drop(svc.execute(update(booking::Status::Cancelled)).await.unwrap());

        let err = svc
            .execute(update(booking::Status::Completed))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidTransition {
                from: booking::Status::Cancelled,
                ..
            },
        ));
    }

    #[tokio::test]
    async fn requires_operator() {
        let db = Mock::default();
        let agent = mock::agent();
        db.execute(Insert(agent.clone())).await.unwrap();
        let b = booking(agent.id);
        db.execute(Insert(b.clone())).await.unwrap();
        let svc = mock::service(db);

        let err = svc
            .execute(UpdateBookingStatus {
                operator_id: agent.id,
                booking_id: b.id,
                status: booking::Status::Confirmed,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotOperator(_)));
    }
}
