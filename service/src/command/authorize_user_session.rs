//! [`Command`] for authorizing a [`User`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`] by a [`Session`] token.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`session::Token`] to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        // Sessions of deleted `User`s are void.
        self.database()
            .execute(Select(By::new(session.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(session.user_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        Ok(session)
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Session`] token is malformed, forged or expired.
    #[display("Invalid `Session` token: {_0}")]
    InvalidToken(jsonwebtoken::errors::Error),

    /// [`User`] owning the [`Session`] does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, DateTime, Handler as _};

    use crate::{
        command::{create_user_session, CreateUserSession},
        domain::user::session,
        infra::database::mock::{self, Mock},
    };

    use super::{AuthorizeUserSession, ExecutionError};

    #[tokio::test]
    async fn authorizes_issued_session() {
        let db = Mock::default();
        let user = mock::agent();
        db.execute(Insert(user.clone())).await.unwrap();
        let svc = mock::service(db);

        let create_user_session::Output { token, .. } = svc
            .execute(CreateUserSession::ByUserId(user.id))
            .await
            .unwrap();
        let session = svc.execute(AuthorizeUserSession { token }).await.unwrap();

        assert_eq!(session.user_id, user.id);
        assert!(session.expires_at > DateTime::now().coerce());
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let svc = mock::service(Mock::default());

        let token = "nope".parse::<session::Token>().unwrap();
        let err = svc.execute(AuthorizeUserSession { token }).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::InvalidToken(_)));
    }
}
