//! [`User`]-related definitions.

use std::future;

use common::{DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{
    graphql_object, GraphQLInputObject, GraphQLObject, GraphQLScalar,
};
use service::{domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A [`User`] of the system: an agent or an operator.
#[derive(Clone, Debug, From)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`domain::User`] representing this [`User`].
    user: OnceCell<domain::User>,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        Self {
            id: user.id.into(),
            user: OnceCell::new_with(Some(user)),
        }
    }
}

impl User {
    /// Creates a new [`User`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`User`] with the provided ID exists,
    /// otherwise accessing this [`User`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            user: OnceCell::new(),
        }
    }

    /// Returns the [`domain::User`] representing this [`User`].
    ///
    /// # Errors
    ///
    /// Error if the [`domain::User`] doesn't exist.
    async fn user(&self, ctx: &Context) -> Result<&domain::User, Error> {
        let id = self.id.into();
        self.user
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::user::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|u| {
                        future::ready(u.ok_or_else(|| {
                            api::query::UserError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A `User` of the system: an agent or an operator.
#[graphql_object(context = Context)]
impl User {
    /// Unique identifier of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Name of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.user(ctx).await?.name.clone().into())
    }

    /// Email of this `User`, used to sign in.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.email",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn email(&self, ctx: &Context) -> Result<Email, Error> {
        Ok(self.user(ctx).await?.email.clone().into())
    }

    /// Phone of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.phone",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn phone(&self, ctx: &Context) -> Result<Phone, Error> {
        Ok(self.user(ctx).await?.phone.clone().into())
    }

    /// Name of the travel company this `User` works for, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.company",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn company(
        &self,
        ctx: &Context,
    ) -> Result<Option<CompanyName>, Error> {
        Ok(self.user(ctx).await?.company.clone().map(Into::into))
    }

    /// Role of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.role",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn role(&self, ctx: &Context) -> Result<Role, Error> {
        Ok(self.user(ctx).await?.role.into())
    }

    /// Wallet balance of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.balance",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn balance(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.user(ctx).await?.balance)
    }

    /// Discount figures last saved onto this `User`'s profile, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.discount",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn discount(
        &self,
        ctx: &Context,
    ) -> Result<Option<DiscountSnapshot>, Error> {
        Ok(self.user(ctx).await?.discount.map(Into::into))
    }

    /// KYC documents this `User` registered with.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.documents",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn documents(&self, ctx: &Context) -> Result<Vec<Document>, Error> {
        ctx.service()
            .execute(query::user::Documents::by(self.id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|docs| docs.into_iter().map(Into::into).collect())
    }

    /// `DateTime` when this `User` registered.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.user(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `User`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::user::Id)]
#[into(domain::user::Id)]
#[graphql(name = "UserId", transparent)]
pub struct Id(Uuid);

/// Name of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserName",
    with = scalar::Via::<domain::user::Name>,
)]
pub struct Name(domain::user::Name);

/// Password of a `User`.
#[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserPassword",
    with = scalar::Via::<domain::user::Password>,
)]
pub struct Password(domain::user::Password);

/// Email of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserEmail",
    with = scalar::Via::<domain::user::Email>,
)]
pub struct Email(domain::user::Email);

/// Phone of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserPhone",
    with = scalar::Via::<domain::user::Phone>,
)]
pub struct Phone(domain::user::Phone);

/// Travel company name of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserCompanyName",
    with = scalar::Via::<domain::user::CompanyName>,
)]
pub struct CompanyName(domain::user::CompanyName);

/// Public URL of an uploaded KYC document.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "DocumentUrl",
    with = scalar::Via::<domain::user::document::Url>,
)]
pub struct DocumentUrl(domain::user::document::Url);

define_enum! {
    #[doc = "Role of a `User`."]
    #[graphql(name = "UserRole")]
    enum Role = domain::user::Role {
        #[doc = "Travel agent booking handling services."]
        Agent,

        #[doc = "Handling staff managing bookings and discounts."]
        Operator,
    }
}

define_enum! {
    #[doc = "Kind of a KYC document."]
    #[graphql(name = "DocumentKind")]
    enum DocumentKind = domain::user::document::Kind {
        #[doc = "National identity card (KTP)."]
        IdentityCard,

        #[doc = "Business license of the travel company."]
        BusinessLicense,

        #[doc = "Tax identification number (NPWP)."]
        TaxId,
    }
}

/// KYC document of a `User`.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct Document {
    /// Kind of this `Document`.
    pub kind: DocumentKind,

    /// Public URL of this `Document`.
    pub url: DocumentUrl,

    /// `DateTime` when this `Document` was uploaded.
    pub uploaded_at: DateTime,
}

impl From<domain::user::Document> for Document {
    fn from(doc: domain::user::Document) -> Self {
        Self {
            kind: doc.kind.into(),
            url: doc.url.into(),
            uploaded_at: doc.uploaded_at.coerce(),
        }
    }
}

/// KYC document already uploaded to the storage.
#[derive(Clone, Debug, GraphQLInputObject)]
pub struct DocumentInput {
    /// Kind of the document.
    pub kind: DocumentKind,

    /// Public URL the document was uploaded to.
    pub url: DocumentUrl,
}

impl From<DocumentInput>
    for (domain::user::document::Kind, domain::user::document::Url)
{
    fn from(input: DocumentInput) -> Self {
        (input.kind.into(), input.url.into())
    }
}

/// Discount figures saved onto a `User`'s profile.
#[derive(Clone, Copy, Debug, GraphQLObject)]
pub struct DiscountSnapshot {
    /// Discount granted on the reference order.
    pub discount: Money,

    /// Price to pay for the reference order.
    pub total: Money,
}

impl From<domain::discount::Snapshot> for DiscountSnapshot {
    fn from(s: domain::discount::Snapshot) -> Self {
        Self {
            discount: s.discount,
            total: s.total,
        }
    }
}

pub mod session {
    //! [`Session`]-related definitions.
    //!
    //! [`Session`]: crate::Session

    use common::DateTime;
    use derive_more::{AsRef, From, Into};
    use juniper::{GraphQLObject, GraphQLScalar};
    use service::{command, domain};

    use crate::{
        api::{self, scalar},
        Context,
    };

    /// `Session` access token.
    #[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
    #[graphql(
        name = "UserAuthToken",
        with = scalar::Via::<domain::user::session::Token>,
    )]
    pub struct Token(domain::user::session::Token);

    /// Result of a `Session` creation.
    #[derive(Clone, Debug, From, GraphQLObject)]
    #[graphql(context = Context, name = "CreateSessionResult")]
    pub struct CreateResult {
        /// Access token of the created `Session`.
        pub token: Token,

        /// `User` associated with the created `Session`.
        pub user: api::User,

        /// `DateTime` when the created `Session` expires.
        pub expires_at: DateTime,
    }

    impl From<command::create_user_session::Output> for CreateResult {
        fn from(output: command::create_user_session::Output) -> Self {
            let command::create_user_session::Output {
                token,
                user,
                expires_at,
            } = output;
            Self {
                token: token.into(),
                user: user.into(),
                expires_at: expires_at.coerce(),
            }
        }
    }
}

pub mod list {
    //! Definitions related to [`User`] list.

    use derive_more::{AsRef, From, Into};
    use juniper::{graphql_object, GraphQLScalar};
    use service::{query, read, Query as _};

    use crate::{api::scalar, AsError, Context, Error};

    use super::{Id, User};

    /// Cursor for the `User` list.
    #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
    #[from(Id, read::user::list::Cursor)]
    #[graphql(
        name = "UserListCursor",
        with = scalar::Via::<read::user::list::Cursor>,
    )]
    pub struct Cursor(pub read::user::list::Cursor);

    /// Edge in the [`User`] list.
    #[derive(Clone, Copy, Debug, From, Into)]
    pub struct Edge(read::user::list::Edge);

    /// Edge in the `User` list.
    #[graphql_object(name = "UserListEdge", context = Context)]
    impl Edge {
        /// Cursor of this `UserListEdge`.
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            self.0.cursor.into()
        }

        /// Node of this `UserListEdge`.
        #[must_use]
        pub fn node(&self) -> User {
            #[expect(
                unsafe_code,
                reason = "`Edge` loaded from repository guarantees `User` \
                          existence"
            )]
            unsafe {
                User::new_unchecked(self.0.node)
            }
        }
    }

    /// Connection of the [`User`] list.
    #[derive(Clone, Debug)]
    pub struct Connection {
        /// Underlying [`read::user::list::Connection`].
        connection: read::user::list::Connection,

        /// [`read::user::list::Filter`] the page was selected with.
        filter: read::user::list::Filter,
    }

    impl Connection {
        /// Wraps the provided page selected with the provided `filter`.
        #[must_use]
        pub const fn new(
            connection: read::user::list::Connection,
            filter: read::user::list::Filter,
        ) -> Self {
            Self { connection, filter }
        }
    }

    /// Connection of the `User` list.
    #[graphql_object(name = "UserListConnection", context = Context)]
    impl Connection {
        /// Edges in this `UserListConnection`.
        #[must_use]
        pub fn edges(&self) -> Vec<Edge> {
            self.connection.edges.iter().copied().map(Into::into).collect()
        }

        /// Information about the page.
        #[must_use]
        pub fn page_info(&self) -> PageInfo {
            PageInfo {
                info: self.connection.page_info(),
                start_cursor: self
                    .connection
                    .edges
                    .first()
                    .map(|e| e.cursor.into()),
                end_cursor: self.connection.edges.last().map(|e| e.cursor.into()),
            }
        }

        /// Total count of `User`s matching the filter.
        pub async fn total_count(&self, ctx: &Context) -> Result<i32, Error> {
            ctx.service()
                .execute(query::users::TotalCount::by(self.filter.clone()))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())
                .map(Into::into)
        }
    }

    /// Information about a [`Connection`] page.
    #[derive(Clone, Copy, Debug)]
    pub struct PageInfo {
        /// Underlying [`read::user::list::PageInfo`].
        info: read::user::list::PageInfo,

        /// Start cursor of the page.
        start_cursor: Option<Cursor>,

        /// End cursor of the page.
        end_cursor: Option<Cursor>,
    }

    /// Information about a `UserListConnection` page.
    #[graphql_object(name = "UserListPageInfo", context = Context)]
    impl PageInfo {
        /// Indicator whether there is a next page.
        #[must_use]
        pub fn has_next_page(&self) -> bool {
            self.info.has_next_page
        }

        /// Indicator whether there is a previous page.
        #[must_use]
        pub fn has_previous_page(&self) -> bool {
            self.info.has_previous_page
        }

        /// Start cursor of the page.
        #[must_use]
        pub fn start_cursor(&self) -> &Option<Cursor> {
            &self.start_cursor
        }

        /// End cursor of the page.
        #[must_use]
        pub fn end_cursor(&self) -> &Option<Cursor> {
            &self.end_cursor
        }
    }
}
