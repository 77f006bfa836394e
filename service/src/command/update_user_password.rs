//! [`Command`] for updating a [`user::Password`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::Password;
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`user::Password`].
#[derive(Debug)]
pub struct UpdateUserPassword {
    /// ID of the [`User`] whose [`Password`] should be updated.
    pub user_id: user::Id,

    /// New [`Password`] of the [`User`].
    pub new_password: SecretBox<user::Password>,

    /// Current [`Password`] of the [`User`].
    pub old_password: SecretBox<user::Password>,
}

impl<Db> Command<UpdateUserPassword> for Service<Db>
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
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateUserPassword,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUserPassword {
            user_id,
            new_password,
            old_password,
        } = cmd;

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
        if !user.password_hash.verify(old_password.expose_secret()) {
            return Err(tracerr::new!(E::WrongPassword));
        }

        if new_password.expose_secret() == old_password.expose_secret() {
            return Ok(user);
        }

        user.password_hash =
            user::PasswordHash::new(new_password.expose_secret())
                .map_err(tracerr::from_and_wrap!(=> E))?;
        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`UpdateUserPassword`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// New [`Password`] hashing failed.
    #[display("Failed to hash the password: {_0}")]
    #[from]
    PasswordHash(bcrypt::BcryptError),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),

    /// Wrong old [`Password`] provided.
    #[display("Wrong old password")]
    WrongPassword,
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};
    use secrecy::SecretBox;

    use crate::{
        domain::{user, User},
        infra::database::mock::{self, Mock},
        Command as _,
    };

    use super::{ExecutionError, UpdateUserPassword};

    fn secret(password: &str) -> SecretBox<user::Password> {
        SecretBox::new(Box::new(user::Password::new(password).unwrap()))
    }

    #[tokio::test]
    async fn updates_password() {
        let db = Mock::default();
        let agent = mock::agent();
        db.execute(Insert(agent.clone())).await.unwrap();
        let svc = mock::service(db.clone());

        drop(
            svc.execute(UpdateUserPassword {
                user_id: agent.id,
                new_password: secret("baru-rahasia"),
                old_password: secret(mock::PASSWORD),
            })
            .await
            .unwrap(),
        );

        let stored = db
            .execute(Select(By::<Option<User>, _>::new(agent.id)))
            .await
            .unwrap()
            .unwrap();
        let new = user::Password::new("baru-rahasia").unwrap();
        assert!(stored.password_hash.verify(&new));
    }

    #[tokio::test]
    async fn requires_old_password() {
        let db = Mock::default();
        let agent = mock::agent();
        db.execute(Insert(agent.clone())).await.unwrap();
        let svc = mock::service(db);

        let err = svc
            .execute(UpdateUserPassword {
                user_id: agent.id,
                new_password: secret("baru-rahasia"),
                old_password: secret("salah-sandi"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::WrongPassword));
    }
}
