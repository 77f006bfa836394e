//! [`Command`] for saving a [`Discount`] of an agent [`User`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        booking,
        discount::{self, Discount},
        user, User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for saving a [`Discount`] of an agent [`User`].
///
/// The [`discount::Snapshot`] stored onto the agent's profile is computed
/// against the provided reference order.
#[derive(Clone, Copy, Debug)]
pub struct SaveDiscount {
    /// ID of the operator [`User`] saving the [`Discount`].
    pub operator_id: user::Id,

    /// ID of the agent [`User`] the [`Discount`] is granted to.
    pub user_id: user::Id,

    /// [`discount::Value`] per passenger.
    pub value: discount::Value,

    /// Whether the [`Discount`] is applied at all.
    pub is_active: bool,

    /// Subtotal of the reference order.
    pub reference_subtotal: Money,

    /// Passengers of the reference order.
    pub reference_passengers: booking::Passengers,
}

impl<Db> Command<SaveDiscount> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
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
        > + Database<Update<Discount>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<User>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = (Discount, User);
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SaveDiscount,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SaveDiscount {
            operator_id,
            user_id,
            value,
            is_active,
            reference_subtotal,
            reference_passengers,
        } = cmd;

        let operator = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(operator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(operator_id))
            .map_err(tracerr::wrap!())?;
        if !operator.is_operator() {
            return Err(tracerr::new!(E::NotOperator(operator_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `User`.
        tx.execute(Lock(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;
        if user.is_operator() {
            return Err(tracerr::new!(E::NotAgent(user_id)));
        }

        let discount = Discount {
            user_id,
            kind: discount::Kind::FlatPerPassenger,
            value,
            is_active,
            updated_at: DateTime::now().coerce(),
        };
        tx.execute(Update(discount.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let applied = discount.apply(reference_subtotal, reference_passengers);
        user.discount = Some(applied.into());
        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::info!(
            operator.id = %operator_id,
            user.id = %user_id,
            value = %discount.value.get(),
            is_active,
            "discount saved",
        );

        Ok((discount, user))
    }
}

/// Error of [`SaveDiscount`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] is not an operator.
    #[display("`User(id: {_0})` is not an operator")]
    #[from(ignore)]
    NotOperator(#[error(not(source))] user::Id),

    /// [`User`] is not an agent, so cannot be granted a [`Discount`].
    #[display("`User(id: {_0})` is not an agent")]
    #[from(ignore)]
    NotAgent(#[error(not(source))] user::Id),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Insert, Select},
        Money,
    };
    use rust_decimal::Decimal;

    use crate::{
        domain::{booking::Passengers, discount, user, Discount, User},
        infra::database::mock::{self, Mock},
        Command as _,
    };

    use super::{ExecutionError, SaveDiscount};

    fn cmd(operator: &User, agent: &User, value: i64) -> SaveDiscount {
        SaveDiscount {
            operator_id: operator.id,
            user_id: agent.id,
            value: discount::Value::new(Decimal::from(value)).unwrap(),
            is_active: true,
            reference_subtotal: Money::from_rupiah(135_000),
            reference_passengers: Passengers::new(3).unwrap(),
        }
    }

    #[tokio::test]
    async fn saves_discount_and_snapshot() {
        let db = Mock::default();
        let (operator, agent) = (mock::operator(), mock::agent());
        db.execute(Insert(operator.clone())).await.unwrap();
        db.execute(Insert(agent.clone())).await.unwrap();
        let svc = mock::service(db.clone());

        drop(svc.execute(cmd(&operator, &agent, 10_000)).await.unwrap());
        let (saved, user) =
            svc.execute(cmd(&operator, &agent, 60_000)).await.unwrap();

        let snapshot = user.discount.unwrap();
        assert_eq!(snapshot.discount, Money::from_rupiah(135_000));
        assert_eq!(snapshot.total, Money::ZERO);

        let stored = db
            .execute(Select(By::<Option<Discount>, _>::new(agent.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, saved);
        assert_eq!(stored.value.get(), Decimal::from(60_000));
    }

    #[tokio::test]
    async fn requires_operator() {
        let db = Mock::default();
        let agent = mock::agent();
        db.execute(Insert(agent.clone())).await.unwrap();
        let svc = mock::service(db);

        let err = svc.execute(cmd(&agent, &agent, 10_000)).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotOperator(_)));
    }

    #[tokio::test]
    async fn grants_only_agents() {
        let db = Mock::default();
        let operator = mock::operator();
        let mut other = mock::operator();
        other.email = user::Email::new("supervisor@handling.id").unwrap();
        db.execute(Insert(operator.clone())).await.unwrap();
        db.execute(Insert(other.clone())).await.unwrap();
        let svc = mock::service(db.clone());

        let err = svc.execute(cmd(&operator, &other, 10_000)).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotAgent(_)));
        assert!(db
            .execute(Select(By::<Option<Discount>, _>::new(other.id)))
            .await
            .unwrap()
            .is_none());
    }
}
