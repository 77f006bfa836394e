//! [`Booking`]-related definitions.

use std::future;

use common::{Date, DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLInputObject, GraphQLScalar};
use service::{domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, AsError, Context, Error};

/// Handling services booked by an agent for a group of travelers.
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    id: Id,

    /// Underlying [`domain::Booking`].
    booking: OnceCell<domain::Booking>,
}

impl From<domain::Booking> for Booking {
    fn from(booking: domain::Booking) -> Self {
        Self {
            id: booking.id.into(),
            booking: OnceCell::new_with(Some(booking)),
        }
    }
}

impl Booking {
    /// Creates a new [`Booking`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Booking`] with the provided ID exists,
    /// otherwise accessing this [`Booking`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            booking: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Booking`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Booking`] doesn't exist.
    async fn booking(&self, ctx: &Context) -> Result<&domain::Booking, Error> {
        let id = self.id.into();
        self.booking
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::booking::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|b| {
                        future::ready(b.ok_or_else(|| {
                            api::query::BookingError::NotExists.into()
                        }))
                    })
            })
            .await
    }

    /// Returns the [`domain::booking::Details`] of this [`Booking`].
    async fn details(
        &self,
        ctx: &Context,
    ) -> Result<&domain::booking::Details, Error> {
        Ok(&self.booking(ctx).await?.details)
    }
}

/// Handling services booked by an agent for a group of travelers.
#[graphql_object(context = Context)]
impl Booking {
    /// Unique identifier of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Agent `User` who made this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.agent",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn agent(&self, ctx: &Context) -> Result<api::User, Error> {
        let user_id = self.booking(ctx).await?.user_id;
        #[expect(unsafe_code, reason = "`Booking` references existing `User`")]
        Ok(unsafe { api::User::new_unchecked(user_id) })
    }

    /// Name of the traveler in charge of the group.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.customerName",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn customer_name(
        &self,
        ctx: &Context,
    ) -> Result<CustomerName, Error> {
        Ok(self.details(ctx).await?.customer_name.clone().into())
    }

    /// Phone of the traveler in charge of the group.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.customerPhone",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn customer_phone(
        &self,
        ctx: &Context,
    ) -> Result<api::user::Phone, Error> {
        Ok(self.details(ctx).await?.customer_phone.clone().into())
    }

    /// Number of passengers.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.passengers",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn passengers(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(self.details(ctx).await?.passengers.get().into())
    }

    /// Booked `TravelType`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.travelTypes",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn travel_types(
        &self,
        ctx: &Context,
    ) -> Result<Vec<TravelType>, Error> {
        Ok(self
            .details(ctx)
            .await?
            .selection
            .types()
            .map(Into::into)
            .collect())
    }

    /// Human-readable label of the booked `TravelType`s, e.g.
    /// `Arrival + Departure`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.travelLabel",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn travel_label(&self, ctx: &Context) -> Result<String, Error> {
        Ok(self.details(ctx).await?.selection.label())
    }

    /// Number of additional baggage items.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.baggage",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn baggage(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(self.details(ctx).await?.baggage.into())
    }

    /// Where travelers are picked up, if the `TravelType`s require it.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.pickupArea",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn pickup_area(
        &self,
        ctx: &Context,
    ) -> Result<Option<String>, Error> {
        Ok(self.details(ctx).await?.pickup_area.as_ref().map(|a| a.to_string()))
    }

    /// Where travelers are dropped off, if the `TravelType`s require it.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.dropoffArea",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn dropoff_area(
        &self,
        ctx: &Context,
    ) -> Result<Option<String>, Error> {
        Ok(self
            .details(ctx)
            .await?
            .dropoff_area
            .as_ref()
            .map(|a| a.to_string()))
    }

    /// Flight of the group, if known.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.flightNumber",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn flight_number(
        &self,
        ctx: &Context,
    ) -> Result<Option<String>, Error> {
        Ok(self
            .details(ctx)
            .await?
            .flight_number
            .as_ref()
            .map(|f| f.to_string()))
    }

    /// `Date` of the flight.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.flightDate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn flight_date(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.details(ctx).await?.flight_date)
    }

    /// Remarks for the handling crew, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.notes",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn notes(&self, ctx: &Context) -> Result<Option<String>, Error> {
        Ok(self.details(ctx).await?.notes.as_ref().map(|n| n.to_string()))
    }

    /// Price breakdown of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.price",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn price(&self, ctx: &Context) -> Result<api::pricing::Quote, Error> {
        Ok(self.booking(ctx).await?.price.into())
    }

    /// Price to pay for this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.total",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn total(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.booking(ctx).await?.price.total)
    }

    /// `PaymentMethod` chosen for this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.paymentMethod",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn payment_method(
        &self,
        ctx: &Context,
    ) -> Result<PaymentMethod, Error> {
        Ok(self.booking(ctx).await?.payment_method.into())
    }

    /// `Bank` chosen for a `BANK_TRANSFER`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.bank",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn bank(&self, ctx: &Context) -> Result<Option<Bank>, Error> {
        Ok(self.booking(ctx).await?.bank.map(Into::into))
    }

    /// `PaymentStatus` of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.paymentStatus",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn payment_status(
        &self,
        ctx: &Context,
    ) -> Result<PaymentStatus, Error> {
        Ok(self.booking(ctx).await?.payment_status.into())
    }

    /// `BookingStatus` of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.booking(ctx).await?.status.into())
    }

    /// `DateTime` when this `Booking` was made.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.booking(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Booking`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::booking::Id)]
#[into(domain::booking::Id)]
#[graphql(name = "BookingId", transparent)]
pub struct Id(Uuid);

/// Name of the traveler in charge of a `Booking`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "CustomerName",
    with = api::scalar::Via::<domain::booking::CustomerName>,
)]
pub struct CustomerName(domain::booking::CustomerName);

define_enum! {
    #[doc = "Airport handling service type."]
    #[graphql(name = "TravelType")]
    enum TravelType = domain::travel::Type {
        #[doc = "Meeting travelers on arrival."]
        Arrival,

        #[doc = "Seeing travelers off on departure."]
        Departure,

        #[doc = "Assisting travelers between connecting flights."]
        Transit,
    }
}

define_enum! {
    #[doc = "Lifecycle status of a `Booking`."]
    #[graphql(name = "BookingStatus")]
    enum Status = domain::booking::Status {
        #[doc = "Submitted, awaiting confirmation."]
        Pending,

        #[doc = "Confirmed by an operator."]
        Confirmed,

        #[doc = "Handling has been performed."]
        Completed,

        #[doc = "Called off."]
        Cancelled,
    }
}

define_enum! {
    #[doc = "Way a `Booking` is paid."]
    #[graphql(name = "PaymentMethod")]
    enum PaymentMethod = domain::payment::Method {
        #[doc = "Paid in cash on site."]
        Cash,

        #[doc = "Paid by a transfer to one of the `Bank`s."]
        BankTransfer,

        #[doc = "Debited off the agent wallet balance."]
        UseSaldo,
    }
}

define_enum! {
    #[doc = "Bank accepting a `BANK_TRANSFER`."]
    #[graphql(name = "Bank")]
    enum Bank = domain::payment::Bank {
        #[doc = "Bank Central Asia."]
        Bca,

        #[doc = "Bank Negara Indonesia."]
        Bni,

        #[doc = "Bank Rakyat Indonesia."]
        Bri,

        #[doc = "Bank Mandiri."]
        Mandiri,
    }
}

define_enum! {
    #[doc = "Status of a `Booking` payment."]
    #[graphql(name = "PaymentStatus")]
    enum PaymentStatus = domain::payment::Status {
        #[doc = "Awaiting the payment."]
        Pending,

        #[doc = "Paid in full."]
        Paid,

        #[doc = "Payment did not go through."]
        Failed,
    }
}

/// Booking wizard contents to submit.
///
/// Fields are validated all at once, and every invalid one is reported in
/// the `fields` extension of the `INVALID_BOOKING` error.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "BookingDraftInput")]
pub struct DraftInput {
    /// Number of passengers, from 1 to 200.
    pub passengers: i32,

    /// `TravelType`s to book, applied in order.
    ///
    /// `TRANSIT` cannot be combined with `ARRIVAL` or `DEPARTURE`, so the
    /// latest of them wins.
    pub travel_types: Vec<TravelType>,

    /// Number of additional baggage items.
    pub baggage: Option<i32>,

    /// Pickup area, required for `ARRIVAL` and `TRANSIT`.
    pub pickup_area: Option<String>,

    /// Dropoff area, required for `DEPARTURE` and `TRANSIT`.
    pub dropoff_area: Option<String>,

    /// Name of the traveler in charge of the group.
    pub customer_name: String,

    /// Phone of the traveler in charge of the group.
    pub customer_phone: String,

    /// Flight number, e.g. `GA 410`.
    pub flight_number: Option<String>,

    /// `Date` of the flight.
    pub flight_date: Option<Date>,

    /// Remarks for the handling crew.
    pub notes: Option<String>,
}

impl DraftInput {
    /// Fills a [`domain::booking::Draft`] in the way the booking wizard does.
    ///
    /// # Errors
    ///
    /// If a count doesn't fit into its domain type.
    pub fn into_draft(self) -> Result<domain::booking::Draft, Error> {
        let Self {
            passengers,
            travel_types,
            baggage,
            pickup_area,
            dropoff_area,
            customer_name,
            customer_phone,
            flight_number,
            flight_date,
            notes,
        } = self;

        let mut draft = domain::booking::Draft::default();
        // Out of range counts are reported by the validation itself.
        draft.passengers =
            u16::try_from(passengers.clamp(0, i32::from(u16::MAX)))
                .unwrap_or_default();
        draft.baggage = baggage
            .map(u16::try_from)
            .transpose()
            .map_err(|_| api::InputError::Count)?
            .unwrap_or_default();
        draft.customer_name = customer_name;
        draft.customer_phone = customer_phone;
        draft.flight_number = flight_number;
        draft.flight_date = flight_date;
        draft.notes = notes;
        for ty in travel_types {
            draft.select_travel(ty.into());
        }
        if let Some(area) = pickup_area {
            draft.set_pickup_area(area);
        }
        if let Some(area) = dropoff_area {
            draft.set_dropoff_area(area);
        }
        Ok(draft)
    }
}

/// Payment chosen for a `Booking`.
#[derive(Clone, Copy, Debug, GraphQLInputObject)]
#[graphql(name = "PaymentInput")]
pub struct PaymentInput {
    /// `PaymentMethod` to pay with.
    pub method: PaymentMethod,

    /// `Bank` to transfer to, required for `BANK_TRANSFER`.
    pub bank: Option<Bank>,
}

impl From<PaymentInput> for domain::payment::Selection {
    fn from(input: PaymentInput) -> Self {
        match input.method {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::BankTransfer => {
                Self::BankTransfer(input.bank.map(Into::into))
            }
            PaymentMethod::UseSaldo => Self::UseSaldo,
        }
    }
}

pub mod list {
    //! Definitions related to the [`Booking`] list.

    use common::Date;
    use derive_more::{AsRef, From, Into};
    use juniper::{graphql_object, GraphQLInputObject, GraphQLScalar};
    use service::{query, read, Query as _};

    use crate::{api, AsError, Context, Error};

    use super::{Booking, CustomerName, PaymentStatus, Status, TravelType};

    /// Cursor for the `Booking` list.
    #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
    #[from(super::Id, read::booking::list::Cursor)]
    #[graphql(
        name = "BookingListCursor",
        with = api::scalar::Via::<read::booking::list::Cursor>,
    )]
    pub struct Cursor(pub read::booking::list::Cursor);

    /// Filter of the `Booking` list.
    #[derive(Clone, Debug, Default, GraphQLInputObject)]
    #[graphql(name = "BookingFilterInput")]
    pub struct FilterInput {
        /// `BookingStatus`es to include. All when omitted.
        pub statuses: Option<Vec<Status>>,

        /// `PaymentStatus`es to include. All when omitted.
        pub payment_statuses: Option<Vec<PaymentStatus>>,

        /// `TravelType` the `Booking`s must include.
        pub travel_type: Option<TravelType>,

        /// `CustomerName` (or its part) to search for.
        pub customer_name: Option<CustomerName>,

        /// ID of the agent `User` who made the `Booking`s.
        ///
        /// Ignored for agents, who only ever see their own `Booking`s.
        pub agent_id: Option<api::user::Id>,

        /// First `Date` of creation to include.
        pub created_from: Option<Date>,

        /// Last `Date` of creation to include.
        pub created_to: Option<Date>,
    }

    impl FilterInput {
        /// Resolves this [`FilterInput`] into the
        /// [`read::booking::list::Filter`] the current `User` is allowed to
        /// list [`Booking`]s with.
        ///
        /// Agents are always scoped to their own [`Booking`]s.
        ///
        /// # Errors
        ///
        /// If the current HTTP request is not authorized.
        pub async fn scoped(
            self,
            ctx: &Context,
        ) -> Result<read::booking::list::Filter, Error> {
            let my_id = ctx.current_session().await?.user_id;
            let mut filter = read::booking::list::Filter::from(self);
            if !ctx.is_operator(my_id).await? {
                filter.user_id = Some(my_id.into());
            }
            Ok(filter)
        }
    }

    impl From<FilterInput> for read::booking::list::Filter {
        fn from(input: FilterInput) -> Self {
            let FilterInput {
                statuses,
                payment_statuses,
                travel_type,
                customer_name,
                agent_id,
                created_from,
                created_to,
            } = input;
            Self {
                user_id: agent_id.map(Into::into),
                statuses: statuses
                    .unwrap_or_default()
                    .into_iter()
                    .map(Into::into)
                    .collect(),
                payment_statuses: payment_statuses
                    .unwrap_or_default()
                    .into_iter()
                    .map(Into::into)
                    .collect(),
                travel_type: travel_type.map(Into::into),
                customer_name: customer_name.map(Into::into),
                created_from,
                created_to,
            }
        }
    }

    /// Edge in the [`Booking`] list.
    #[derive(Clone, Copy, Debug, From, Into)]
    pub struct Edge(read::booking::list::Edge);

    /// Edge in the `Booking` list.
    #[graphql_object(name = "BookingListEdge", context = Context)]
    impl Edge {
        /// Cursor of this `BookingListEdge`.
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            self.0.cursor.into()
        }

        /// Node of this `BookingListEdge`.
        #[must_use]
        pub fn node(&self) -> Booking {
            #[expect(
                unsafe_code,
                reason = "`Edge` loaded from repository guarantees `Booking` \
                          existence"
            )]
            unsafe {
                Booking::new_unchecked(self.0.node)
            }
        }
    }

    /// Connection of the [`Booking`] list.
    #[derive(Clone, Debug)]
    pub struct Connection {
        /// Underlying [`read::booking::list::Connection`].
        connection: read::booking::list::Connection,

        /// [`read::booking::list::Filter`] the page was selected with.
        filter: read::booking::list::Filter,
    }

    impl Connection {
        /// Wraps the provided page selected with the provided `filter`.
        #[must_use]
        pub const fn new(
            connection: read::booking::list::Connection,
            filter: read::booking::list::Filter,
        ) -> Self {
            Self { connection, filter }
        }
    }

    /// Connection of the `Booking` list.
    #[graphql_object(name = "BookingListConnection", context = Context)]
    impl Connection {
        /// Edges in this `BookingListConnection`.
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
            }
        }

        /// Total count of `Booking`s matching the filter.
        pub async fn total_count(&self, ctx: &Context) -> Result<i32, Error> {
            ctx.service()
                .execute(query::bookings::TotalCount::by(self.filter.clone()))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())
                .map(Into::into)
        }
    }

    /// Information about a [`Connection`] page.
    #[derive(Clone, Copy, Debug)]
    pub struct PageInfo {
        /// Underlying [`read::booking::list::PageInfo`].
        info: read::booking::list::PageInfo,

        /// Start cursor of the page.
        start_cursor: Option<Cursor>,
    }

    /// Information about a `BookingListConnection` page.
    #[graphql_object(name = "BookingListPageInfo", context = Context)]
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
        pub fn start_cursor(&self) -> Option<Cursor> {
            self.start_cursor
        }

        /// End cursor of the page.
        #[must_use]
        pub fn end_cursor(&self) -> Option<Cursor> {
            self.info.end_cursor.map(Into::into)
        }
    }
}

#[cfg(test)]
mod spec {
    use service::domain::travel;

    use super::{DraftInput, TravelType};

    fn input() -> DraftInput {
        DraftInput {
            passengers: 3,
            travel_types: vec![TravelType::Transit, TravelType::Arrival],
            baggage: Some(2),
            pickup_area: Some("Terminal 3".into()),
            dropoff_area: Some("Hotel Mulia".into()),
            customer_name: "Ibu Siti Aminah".into(),
            customer_phone: "081234567890".into(),
            flight_number: None,
            flight_date: None,
            notes: None,
        }
    }

    #[test]
    fn fills_draft_in_wizard_order() {
        let draft = input().into_draft().unwrap();

        assert_eq!(draft.passengers, 3);
        assert_eq!(draft.baggage, 2);
        assert!(draft.selection().contains(travel::Type::Arrival));
        assert!(!draft.selection().contains(travel::Type::Transit));
        assert_eq!(draft.pickup_area(), Some("Terminal 3"));
        assert_eq!(draft.dropoff_area(), None);
        assert_eq!(draft.customer_name, "Ibu Siti Aminah");
    }

    #[test]
    fn leaves_passengers_out_of_range_to_validation() {
        let draft = DraftInput {
            passengers: -4,
            ..input()
        }
        .into_draft()
        .unwrap();

        assert_eq!(draft.passengers, 0);
        assert!(draft.validate().is_err());
    }

    #[test]
    fn rejects_negative_baggage() {
        let err = DraftInput {
            baggage: Some(-1),
            ..input()
        }
        .into_draft()
        .unwrap_err();

        assert_eq!(err.code, "INVALID_COUNT");
    }
}
