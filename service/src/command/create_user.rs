//! [`Command`] for registering a new agent [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::user::{CompanyName, Email, Name, Password, Phone};
use crate::{
    domain::{
        user::{self, document, Document},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for registering a new agent [`User`].
#[derive(Debug)]
pub struct CreateUser {
    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Phone`] of a new [`User`].
    pub phone: user::Phone,

    /// [`CompanyName`] of a new [`User`], if any.
    pub company: Option<user::CompanyName>,

    /// KYC documents already uploaded to the storage.
    pub documents: Vec<(document::Kind, document::Url)>,
}

/// Output of [`CreateUser`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Registered [`User`].
    pub user: User,

    /// [`Document`]s of the registered [`User`].
    pub documents: Vec<Document>,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Insert<Document>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            name,
            email,
            password,
            phone,
            company,
            documents,
        } = cmd;

        if documents.is_empty() {
            return Err(tracerr::new!(E::NoDocuments));
        }

        let u = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let password_hash = user::PasswordHash::new(password.expose_secret())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let user = User {
            id: user::Id::new(),
            name,
            email,
            password_hash,
            phone,
            company,
            role: user::Role::Agent,
            balance: Money::ZERO,
            discount: None,
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        };
        let documents = documents
            .into_iter()
            .map(|(kind, url)| Document {
                user_id: user.id,
                kind,
                url,
                uploaded_at: user.created_at.coerce(),
            })
            .collect::<Vec<_>>();

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(user.clone()))
            .await
            .map_err(|e| {
                // Another registration may win the race after the check above.
                if e.as_ref().is_unique_violation("users_email_key") {
                    tracerr::new!(E::EmailOccupied(user.email.clone()))
                } else {
                    tracerr::map_from(e)
                }
            })
            .map(drop)?;
        for doc in &documents {
            tx.execute(Insert(doc.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            user.id = %user.id,
            documents = documents.len(),
            "agent registered",
        );

        Ok(Output { user, documents })
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Email`] is already registered.
    #[display("`{_0}` email is occupied")]
    EmailOccupied(#[error(not(source))] user::Email),

    /// [`Password`] hashing failed.
    #[display("Failed to hash the password: {_0}")]
    #[from]
    PasswordHash(bcrypt::BcryptError),

    /// No KYC document provided.
    #[display("No documents provided")]
    NoDocuments,
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Select},
        Money,
    };
    use secrecy::SecretBox;

    use crate::{
        domain::user::{self, document},
        infra::database::mock::{self, Mock},
        Command as _,
    };

    use super::{CreateUser, ExecutionError};

    fn cmd(email: &str) -> CreateUser {
        CreateUser {
            name: user::Name::new("Budi Santoso").unwrap(),
            email: user::Email::new(email).unwrap(),
            password: SecretBox::new(Box::new(
                user::Password::new("rahasia123").unwrap(),
            )),
            phone: user::Phone::new("081234567890").unwrap(),
            company: user::CompanyName::new("PT Wisata Nusantara"),
            documents: vec![(
                document::Kind::IdentityCard,
                document::Url::new("https://storage.local/kyc/ktp.jpg").unwrap(),
            )],
        }
    }

    #[tokio::test]
    async fn registers_agent() {
        let db = Mock::default();
        let svc = mock::service(db.clone());

        let out = svc.execute(cmd("budi@travel.id")).await.unwrap();

        assert_eq!(out.user.role, user::Role::Agent);
        assert_eq!(out.user.balance, Money::ZERO);
        assert!(out.user.discount.is_none());
        assert_eq!(out.documents.len(), 1);

        let docs = db
            .execute(Select(By::<Vec<user::Document>, _>::new(out.user.id)))
            .await
            .unwrap();
        assert_eq!(docs, out.documents);
    }

    #[tokio::test]
    async fn rejects_occupied_email() {
        let svc = mock::service(Mock::default());
        drop(svc.execute(cmd("budi@travel.id")).await.unwrap());

        let err = svc.execute(cmd("BUDI@travel.id")).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::EmailOccupied(_)));
    }

    #[tokio::test]
    async fn requires_documents() {
        let svc = mock::service(Mock::default());
        let mut cmd = cmd("budi@travel.id");
        cmd.documents.clear();

        let err = svc.execute(cmd).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NoDocuments));
    }
}
