//! [`Command`] for booking handling services.

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        booking::{self, draft},
        discount, ledger,
        payment::{self, Payment},
        pricing, user, Booking, User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for booking handling services on behalf of an agent [`User`].
#[derive(Clone, Debug)]
pub struct CreateBooking {
    /// ID of the agent [`User`] booking.
    pub user_id: user::Id,

    /// [`booking::Draft`] to submit.
    pub draft: booking::Draft,

    /// [`payment::Selection`] to pay with.
    pub payment: payment::Selection,
}

impl<Db> Command<CreateBooking> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<pricing::PriceTable, pricing::Category>>,
            Ok = pricing::PriceTable,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<discount::Discount>, user::Id>>,
            Ok = Option<discount::Discount>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<User, user::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Insert<Booking>, Ok = (), Err = Traced<database::Error>>
        + Database<Insert<Payment>, Ok = (), Err = Traced<database::Error>>
        + Database<Insert<ledger::Entry>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<User>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBooking {
            user_id,
            draft,
            payment,
        } = cmd;

        drop(
            self.database()
                .execute(Select(By::<Option<User>, _>::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(user_id))
                .map_err(tracerr::wrap!())?,
        );

        let details = draft.validate().map_err(tracerr::from_and_wrap!(=> E))?;

        let table = self.price_table().await;
        let discount = self
            .database()
            .execute(Select(By::<Option<discount::Discount>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let price = table.quote(&details.order(), discount.as_ref());

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent balance changes of the same `User`.
        tx.execute(Lock(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        let gate = payment::Gate::new(user.balance, price.total).with(payment);
        if payment == payment::Selection::UseSaldo && !gate.can_use_saldo() {
            return Err(tracerr::new!(E::Payment(
                payment::GateError::InsufficientBalance
            )));
        }
        let (method, bank) =
            gate.validate().map_err(tracerr::from_and_wrap!(=> E))?;
        let payment_status = match method {
            payment::Method::UseSaldo => payment::Status::Paid,
            payment::Method::Cash | payment::Method::BankTransfer => {
                payment::Status::Pending
            }
        };

        let booking = Booking {
            id: booking::Id::new(),
            user_id,
            details,
            price,
            payment_method: method,
            bank,
            payment_status,
            status: booking::Status::Pending,
            created_at: DateTime::now().coerce(),
        };
        tx.execute(Insert(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(Payment {
            id: payment::Id::new(),
            booking_id: booking.id,
            user_id,
            method,
            bank,
            amount: price.total,
            status: payment_status,
            created_at: booking.created_at.coerce(),
        }))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?;

        if method == payment::Method::UseSaldo {
            let entry = ledger::Entry::payment(
                user_id,
                user.balance,
                price.total,
                booking.id,
            )
            .ok_or(E::Payment(payment::GateError::InsufficientBalance))
            .map_err(tracerr::wrap!())?;

            user.balance = entry.balance_after;
            tx.execute(Update(user))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            tx.execute(Insert(entry))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;

            log::info!(
                user.id = %user_id,
                booking.id = %booking.id,
                amount = %price.total,
                "wallet debited",
            );
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::info!(
            user.id = %user_id,
            booking.id = %booking.id,
            total = %booking.price.total,
            payment.method = %method,
            "booking created",
        );

        Ok(booking)
    }
}

/// Error of [`CreateBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`booking::Draft`] is invalid.
    #[display("{_0}")]
    InvalidDraft(draft::Invalid),

    /// [`payment::Selection`] cannot be submitted.
    #[display("{_0}")]
    Payment(payment::GateError),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Insert, Select},
        Date, DateTime, Money,
    };
    use rust_decimal::Decimal;

    use crate::{
        domain::{
            booking::{self, draft, Draft},
            discount::{self, Discount},
            ledger, payment,
            pricing::{PriceKey, PriceTable, ServicePrice},
            travel::Type,
            Booking, User,
        },
        infra::database::mock::{self, Mock, Op},
        Command as _,
    };

    use super::{CreateBooking, ExecutionError};

    fn draft() -> Draft {
        let mut d = Draft::default();
        d.passengers = 3;
        d.customer_name = "Ibu Siti Aminah".into();
        d.customer_phone = "0812-3456-7890".into();
        d.flight_date = Date::from_ymd(2026, 11, 2);
        d.select_travel(Type::Arrival);
        d.select_travel(Type::Departure);
        d.set_pickup_area("Terminal 3");
        d.set_dropoff_area("Hotel Mulia");
        d
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

    async fn stored_user(db: &Mock, agent: &User) -> User {
        db.execute(Select(By::<Option<User>, _>::new(agent.id)))
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn pays_with_saldo() {
        let (db, agent) = setup(200_000).await;
        let svc = mock::service(db.clone());

        let booking = svc
            .execute(CreateBooking {
                user_id: agent.id,
                draft: draft(),
                payment: payment::Selection::UseSaldo,
            })
            .await
            .unwrap();

        assert_eq!(booking.price.subtotal, Money::from_rupiah(135_000));
        assert_eq!(booking.price.discount, Money::from_rupiah(30_000));
        assert_eq!(booking.price.total, Money::from_rupiah(105_000));
        assert_eq!(booking.payment_status, payment::Status::Paid);
        assert_eq!(booking.status, booking::Status::Pending);

        let user = stored_user(&db, &agent).await;
        assert_eq!(user.balance, Money::from_rupiah(95_000));

        let entries = db.ledger(agent.id);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ledger::Kind::Payment);
        assert_eq!(entries[0].balance_after, Money::from_rupiah(95_000));

        let payments = db.payments(booking.id);
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].status, payment::Status::Paid);
    }

    #[tokio::test]
    async fn rejects_saldo_without_balance() {
        let (db, agent) = setup(100_000).await;
        let svc = mock::service(db.clone());

        let err = svc
            .execute(CreateBooking {
                user_id: agent.id,
                draft: draft(),
                payment: payment::Selection::UseSaldo,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Payment(payment::GateError::InsufficientBalance),
        ));
        assert_eq!(
            stored_user(&db, &agent).await.balance,
            Money::from_rupiah(100_000),
        );
        assert!(db.bookings().is_empty());
    }

    #[tokio::test]
    async fn bank_transfer_requires_bank() {
        let (db, agent) = setup(0).await;
        let svc = mock::service(db);

        let err = svc
            .execute(CreateBooking {
                user_id: agent.id,
                draft: draft(),
                payment: payment::Selection::BankTransfer(None),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Payment(payment::GateError::BankRequired),
        ));
    }

    #[tokio::test]
    async fn bank_transfer_stays_pending() {
        let (db, agent) = setup(0).await;
        let svc = mock::service(db.clone());

        let booking = svc
            .execute(CreateBooking {
                user_id: agent.id,
                draft: draft(),
                payment: payment::Selection::BankTransfer(Some(
                    payment::Bank::Mandiri,
                )),
            })
            .await
            .unwrap();

        assert_eq!(booking.payment_method, payment::Method::BankTransfer);
        assert_eq!(booking.bank, Some(payment::Bank::Mandiri));
        assert_eq!(booking.payment_status, payment::Status::Pending);
        assert_eq!(db.payments(booking.id)[0].status, payment::Status::Pending);
        assert!(db.ledger(agent.id).is_empty());
    }

    #[tokio::test]
    async fn reports_invalid_fields() {
        let (db, agent) = setup(0).await;
        let svc = mock::service(db);
        let mut d = draft();
        d.customer_phone = "12345".into();
        d.flight_date = None;

        let err = svc
            .execute(CreateBooking {
                user_id: agent.id,
                draft: d,
                payment: payment::Selection::Cash,
            })
            .await
            .unwrap_err();

        let ExecutionError::InvalidDraft(invalid) = err.as_ref() else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(
            invalid.reason(draft::Field::CustomerPhone),
            Some(draft::Reason::Invalid),
        );
        assert_eq!(
            invalid.reason(draft::Field::FlightDate),
            Some(draft::Reason::Required),
        );
    }

    #[tokio::test]
    async fn rolls_back_on_failure() {
        let (db, agent) = setup(200_000).await;
        db.fail_on(Op::InsertLedgerEntry);
        let svc = mock::service(db.clone());

        let err = svc
            .execute(CreateBooking {
                user_id: agent.id,
                draft: draft(),
                payment: payment::Selection::UseSaldo,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Db(_)));
        assert_eq!(
            stored_user(&db, &agent).await.balance,
            Money::from_rupiah(200_000),
        );
        assert!(db.bookings().is_empty());
        assert!(db.ledger(agent.id).is_empty());
    }

    #[tokio::test]
    async fn uses_fallback_prices() {
        let (db, agent) = setup(0).await;
        db.fail_on(Op::SelectPriceTable);
        let svc = mock::service(db);
        let mut d = draft();
        d.deselect_travel(Type::Departure);

        let booking: Booking = svc
            .execute(CreateBooking {
                user_id: agent.id,
                draft: d,
                payment: payment::Selection::Cash,
            })
            .await
            .unwrap();

        assert_eq!(booking.price.unit_price, Money::from_rupiah(25_000));
        assert_eq!(booking.price.subtotal, Money::from_rupiah(75_000));
        assert_eq!(booking.price.total, Money::from_rupiah(45_000));
    }
}
