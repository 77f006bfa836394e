//! [`Command`] for updating a [`User`] profile.

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`User`] profile.
///
/// Only the provided fields are changed.
#[derive(Clone, Debug, Default)]
pub struct UpdateUserProfile {
    /// ID of the [`User`] to update.
    pub user_id: user::Id,

    /// New [`user::Name`].
    pub name: Option<user::Name>,

    /// New [`user::Phone`].
    pub phone: Option<user::Phone>,

    /// New [`user::CompanyName`], or [`Some`]`(`[`None`]`)` to remove it.
    pub company: Option<Option<user::CompanyName>>,
}

impl<Db> Command<UpdateUserProfile> for Service<Db>
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
        cmd: UpdateUserProfile,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUserProfile {
            user_id,
            name,
            phone,
            company,
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

        let mut changed = false;
        if let Some(name) = name.filter(|n| *n != user.name) {
            user.name = name;
            changed = true;
        }
        if let Some(phone) = phone.filter(|p| *p != user.phone) {
            user.phone = phone;
            changed = true;
        }
        if let Some(company) = company.filter(|c| *c != user.company) {
            user.company = company;
            changed = true;
        }
        if !changed {
            return Ok(user);
        }

        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`UpdateUserProfile`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};

    use crate::{
        domain::{user, User},
        infra::database::mock::{self, Mock},
        Command as _,
    };

    use super::{ExecutionError, UpdateUserProfile};

    #[tokio::test]
    async fn updates_given_fields() {
        let db = Mock::default();
        let agent = mock::agent();
        db.execute(Insert(agent.clone())).await.unwrap();
        let svc = mock::service(db.clone());

        let updated = svc
            .execute(UpdateUserProfile {
                user_id: agent.id,
                phone: user::Phone::new("+6281298765432"),
                company: Some(None),
                ..UpdateUserProfile::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.name, agent.name);
        assert_eq!(updated.phone.to_string(), "+6281298765432");
        assert!(updated.company.is_none());

        let stored = db
            .execute(Select(By::<Option<User>, _>::new(agent.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.phone, updated.phone);
    }

    #[tokio::test]
    async fn fails_for_unknown_user() {
        let svc = mock::service(Mock::default());

        let err = svc
            .execute(UpdateUserProfile {
                user_id: user::Id::new(),
                ..UpdateUserProfile::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UserNotExists(_)));
    }
}
