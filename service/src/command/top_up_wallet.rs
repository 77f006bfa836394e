//! [`Command`] for topping up a wallet balance.

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted, Update},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{ledger, user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for crediting the wallet balance of a [`User`].
///
/// No payment provider is involved: the balance is credited instantly.
#[derive(Clone, Copy, Debug)]
pub struct TopUpWallet {
    /// ID of the [`User`] whose wallet is topped up.
    pub user_id: user::Id,

    /// Amount to credit.
    pub amount: Money,
}

/// Output of [`TopUpWallet`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`User`] with the credited balance.
    pub user: User,

    /// Appended [`ledger::Entry`].
    pub entry: ledger::Entry,
}

impl<Db> Command<TopUpWallet> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<User, user::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>
        + Database<Insert<ledger::Entry>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        TopUpWallet { user_id, amount }: TopUpWallet,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        if amount.is_zero() {
            return Err(tracerr::new!(E::ZeroAmount));
        }

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

        let entry = ledger::Entry::top_up(user_id, user.balance, amount);
        user.balance = entry.balance_after;
        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(entry.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::info!(
            user.id = %user_id,
            amount = %amount,
            balance = %user.balance,
            "wallet topped up",
        );

        Ok(Output { user, entry })
    }
}

/// Error of [`TopUpWallet`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),

    /// Nothing to credit.
    #[display("Top-up amount must be positive")]
    ZeroAmount,
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, Money};

    use crate::{
        domain::{ledger, user},
        infra::database::mock::{self, Mock},
        Command as _,
    };

    use super::{ExecutionError, TopUpWallet};

    #[tokio::test]
    async fn credits_balance() {
        let db = Mock::default();
        let agent = mock::agent();
        db.execute(Insert(agent.clone())).await.unwrap();
        let svc = mock::service(db.clone());

        let top_up = |rupiah| TopUpWallet {
            user_id: agent.id,
            amount: Money::from_rupiah(rupiah),
        };
        drop(svc.execute(top_up(100_000)).await.unwrap());
        let out = svc.execute(top_up(50_000)).await.unwrap();

        assert_eq!(out.user.balance, Money::from_rupiah(150_000));
        assert_eq!(out.entry.kind, ledger::Kind::TopUp);
        assert_eq!(out.entry.balance_after, Money::from_rupiah(150_000));
        assert_eq!(db.ledger(agent.id).len(), 2);
    }

    #[tokio::test]
    async fn rejects_zero_amount() {
        let svc = mock::service(Mock::default());

        let err = svc
            .execute(TopUpWallet {
                user_id: user::Id::new(),
                amount: Money::ZERO,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ZeroAmount));
    }
}
