//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{domain, query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";

    /// Default number of nodes on a page.
    const DEFAULT_PAGE_SIZE: i32 = 10;
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently authenticated `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_user(ctx: &Context) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::user::ById::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `User` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist;
    /// - `NOT_OPERATOR` - the current `User` is not an operator and tries to
    ///                    access another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "user",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn user(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;
        if id != my_id {
            drop(ctx.operator_session().await?);
        }

        ctx.service()
            .execute(query::user::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `User`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - the pagination arguments are
    ///                                     ambiguous;
    /// - `NOT_OPERATOR` - the current `User` is not an operator.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            first = ?first,
            gql.name = "users",
            last = ?last,
            name = ?name.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn users(
        first: Option<i32>,
        after: Option<api::user::list::Cursor>,
        last: Option<i32>,
        before: Option<api::user::list::Cursor>,
        name: Option<api::user::Name>,
        ctx: &Context,
    ) -> Result<api::user::list::Connection, Error> {
        let arguments = read::user::list::Arguments::new(
            first,
            after.map(Into::into),
            last,
            before.map(Into::into),
            Self::DEFAULT_PAGE_SIZE,
        )
        .ok_or_else(|| api::PaginationError::Ambiguous.into())
        .map_err(ctx.error())?;

        drop(ctx.operator_session().await?);

        let filter = read::user::list::Filter {
            name: name.map(Into::into),
        };
        ctx.service()
            .execute(query::users::List::by(read::user::list::Selector {
                arguments,
                filter: filter.clone(),
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|page| api::user::list::Connection::new(page, filter))
    }

    /// Returns the `ServicePrice`s agents are quoted with.
    ///
    /// Never fails on the catalog access: built-in prices are returned if the
    /// catalog cannot be read.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "priceTable",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn price_table(
        ctx: &Context,
    ) -> Result<Vec<api::pricing::ServicePrice>, Error> {
        drop(ctx.current_session().await?);

        ctx.service()
            .execute(query::PriceTable)
            .await
            .map_err(AsError::into_error)
            .map(|table| table.iter().map(Into::into).collect())
    }

    /// Prices an order of the current `User` without booking it.
    ///
    /// The `Discount` of the current `User` is applied, if active, and
    /// `canUseSaldo` tells whether the wallet balance covers the total.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_PASSENGERS` - the number of passengers is out of range;
    /// - `INVALID_COUNT` - the number of baggage items is negative;
    /// - `TRAVEL_TYPE_REQUIRED` - no `TravelType` is selected.
    #[tracing::instrument(
        skip_all,
        fields(
            baggage = ?baggage,
            gql.name = "quote",
            otel.name = Self::SPAN_NAME,
            passengers = passengers,
            travel_types = ?travel_types,
        ),
    )]
    pub async fn quote(
        passengers: i32,
        travel_types: Vec<api::booking::TravelType>,
        baggage: Option<i32>,
        ctx: &Context,
    ) -> Result<api::pricing::OrderQuote, Error> {
        let passengers = u16::try_from(passengers)
            .ok()
            .and_then(domain::booking::Passengers::new)
            .ok_or_else(|| api::InputError::Passengers.into())
            .map_err(ctx.error())?;
        let baggage = baggage
            .map(u16::try_from)
            .transpose()
            .map_err(|_| api::InputError::Count.into())
            .map_err(ctx.error())?
            .unwrap_or_default();

        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::Quote {
                user_id: my_id.into(),
                passengers,
                selection: domain::travel::Selection::of(
                    travel_types.into_iter().map(Into::into),
                ),
                baggage,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Booking` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the specified ID does not
    ///                          exist, or is made by another agent.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "booking",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn booking(
        id: api::booking::Id,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let my_id = ctx.current_session().await?.user_id;

        let booking = ctx
            .service()
            .execute(query::booking::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| BookingError::NotExists.into())
            .map_err(ctx.error())?;
        if api::user::Id::from(booking.user_id) != my_id
            && !ctx.is_operator(my_id).await?
        {
            return Err(BookingError::NotExists.into()).map_err(ctx.error());
        }

        Ok(booking.into())
    }

    /// Fetches the page of `Booking`s, from the oldest to the newest.
    ///
    /// Agents only ever see their own `Booking`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - the pagination arguments are
    ///                                     ambiguous.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            filter = ?filter,
            first = ?first,
            gql.name = "bookings",
            last = ?last,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn bookings(
        first: Option<i32>,
        after: Option<api::booking::list::Cursor>,
        last: Option<i32>,
        before: Option<api::booking::list::Cursor>,
        filter: Option<api::booking::list::FilterInput>,
        ctx: &Context,
    ) -> Result<api::booking::list::Connection, Error> {
        let arguments = read::booking::list::Arguments::new(
            first,
            after.map(Into::into),
            last,
            before.map(Into::into),
            Self::DEFAULT_PAGE_SIZE,
        )
        .ok_or_else(|| api::PaginationError::Ambiguous.into())
        .map_err(ctx.error())?;

        let filter = filter.unwrap_or_default().scoped(ctx).await?;
        ctx.service()
            .execute(query::bookings::List::by(
                read::booking::list::Selector {
                    arguments,
                    filter: filter.clone(),
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|page| api::booking::list::Connection::new(page, filter))
    }

    /// Returns the active `Discount` of the specified agent `User`, if any.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_OPERATOR` - the current `User` is not an operator and tries to
    ///                    access another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            agent_id = %agent_id,
            gql.name = "discount",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn discount(
        agent_id: api::user::Id,
        ctx: &Context,
    ) -> Result<Option<api::discount::Discount>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        if agent_id != my_id {
            drop(ctx.operator_session().await?);
        }

        ctx.service()
            .execute(query::discount::ByUserId::by(agent_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|d| d.map(Into::into))
    }

    /// Fetches the page of wallet `LedgerEntry`s of the specified `User`.
    ///
    /// The current `User` is assumed, if none is specified.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - the pagination arguments are
    ///                                     ambiguous;
    /// - `NOT_OPERATOR` - the current `User` is not an operator and tries to
    ///                    access another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            first = ?first,
            gql.name = "ledger",
            last = ?last,
            otel.name = Self::SPAN_NAME,
            user_id = ?user_id.map(|id| id.to_string()),
        ),
    )]
    pub async fn ledger(
        first: Option<i32>,
        after: Option<api::ledger::list::Cursor>,
        last: Option<i32>,
        before: Option<api::ledger::list::Cursor>,
        user_id: Option<api::user::Id>,
        ctx: &Context,
    ) -> Result<api::ledger::list::Connection, Error> {
        let arguments = read::ledger::list::Arguments::new(
            first,
            after.map(Into::into),
            last,
            before.map(Into::into),
            Self::DEFAULT_PAGE_SIZE,
        )
        .ok_or_else(|| api::PaginationError::Ambiguous.into())
        .map_err(ctx.error())?;

        let my_id = ctx.current_session().await?.user_id;
        let user_id = user_id.unwrap_or(my_id);
        if user_id != my_id {
            drop(ctx.operator_session().await?);
        }

        ctx.service()
            .execute(query::ledger::List::by(read::ledger::list::Selector {
                arguments,
                filter: read::ledger::list::Filter {
                    user_id: user_id.into(),
                },
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for query::quote::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum QuoteError {
                #[code = "TRAVEL_TYPE_REQUIRED"]
                #[status = BAD_REQUEST]
                #[message = "At least one travel type must be selected"]
                NoTravelType,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NoTravelType => Some(QuoteError::NoTravelType.into()),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}

define_error! {
    enum BookingError {
        #[code = "BOOKING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Booking` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}
