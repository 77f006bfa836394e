//! File export HTTP handlers.

use axum::{
    extract::Query,
    response::{IntoResponse, Response},
};
use common::{Date, DateTime};
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use serde::Deserialize;
use service::{domain, query, Query as _};
use uuid::Uuid;

use crate::{api, define_error, AsError, Context, Error, JuniperResponse};

/// URL query parameters of the [`bookings_csv()`] export.
///
/// Mirror the `BookingFilterInput` of the GraphQL API, with a single status
/// of each kind.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsParams {
    /// `BookingStatus` to include.
    pub status: Option<api::booking::Status>,

    /// `PaymentStatus` to include.
    pub payment_status: Option<api::booking::PaymentStatus>,

    /// `TravelType` the bookings must include.
    pub travel_type: Option<api::booking::TravelType>,

    /// Customer name (or its part) to search for.
    pub customer_name: Option<String>,

    /// ID of the agent who made the bookings.
    pub agent_id: Option<Uuid>,

    /// First creation date to include, in `YYYY-MM-DD` form.
    pub from: Option<String>,

    /// Last creation date to include, in `YYYY-MM-DD` form.
    pub to: Option<String>,
}

impl BookingsParams {
    /// Converts these [`BookingsParams`] into the GraphQL filter input.
    ///
    /// # Errors
    ///
    /// If a date or the customer name is malformed.
    fn into_filter_input(
        self,
    ) -> Result<api::booking::list::FilterInput, Error> {
        let Self {
            status,
            payment_status,
            travel_type,
            customer_name,
            agent_id,
            from,
            to,
        } = self;

        let date = |s: Option<String>| {
            s.map(|s| s.parse::<Date>())
                .transpose()
                .map_err(|_| ParamsError::Date)
        };
        let customer_name = customer_name
            .map(|n| {
                domain::booking::CustomerName::new(n.trim())
                    .ok_or(ParamsError::CustomerName)
            })
            .transpose()?;

        Ok(api::booking::list::FilterInput {
            statuses: status.map(|s| vec![s]),
            payment_statuses: payment_status.map(|s| vec![s]),
            travel_type,
            customer_name: customer_name.map(Into::into),
            agent_id: agent_id
                .map(|id| domain::user::Id::from(id).into()),
            created_from: date(from)?,
            created_to: date(to)?,
        })
    }
}

/// Exports the bookings passing the provided [`BookingsParams`] as a CSV
/// file download.
///
/// Agents only ever export their own bookings.
///
/// # Errors
///
/// If the request is not authorized, or its parameters are malformed.
#[tracing::instrument(skip_all)]
pub async fn bookings_csv(
    context: Context,
    Query(params): Query<BookingsParams>,
) -> Result<Response, JuniperResponse> {
    let respond = |e: Error| JuniperResponse {
        status_code: e.status_code,
        response: GraphQLBatchResponse::Single(GraphQLResponse::error(
            e.into_field_error(),
        )),
    };

    let filter = params
        .into_filter_input()
        .map_err(respond)?
        .scoped(&context)
        .await
        .map_err(respond)?;
    let output = context
        .service()
        .execute(query::report::BookingsCsv {
            filter,
            today: DateTime::now().date(),
        })
        .await
        .map_err(AsError::into_error)
        .map_err(respond)?;

    Ok((
        [
            (http::header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                http::header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", output.filename),
            ),
        ],
        output.bytes,
    )
        .into_response())
}

impl AsError for query::report::bookings_csv::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Csv(_) => None,
        }
    }
}

define_error! {
    enum ParamsError {
        #[code = "INVALID_DATE"]
        #[status = BAD_REQUEST]
        #[message = "Dates must be in `YYYY-MM-DD` form"]
        Date,

        #[code = "INVALID_CUSTOMER_NAME"]
        #[status = BAD_REQUEST]
        #[message = "Customer name must be non-blank and at most 128 \
                     characters long"]
        CustomerName,
    }
}

#[cfg(test)]
mod spec {
    use common::Date;

    use crate::api::booking::{PaymentStatus, Status};

    use super::BookingsParams;

    #[test]
    fn converts_params() {
        let params = BookingsParams {
            status: Some(Status::Confirmed),
            payment_status: Some(PaymentStatus::Paid),
            customer_name: Some(" Budi ".into()),
            from: Some("2026-10-01".into()),
            ..BookingsParams::default()
        };

        let input = params.into_filter_input().unwrap();

        assert_eq!(input.statuses, Some(vec![Status::Confirmed]));
        assert_eq!(input.payment_statuses, Some(vec![PaymentStatus::Paid]));
        assert_eq!(input.customer_name.unwrap().to_string(), "Budi");
        assert_eq!(input.created_from, Date::from_ymd(2026, 10, 1));
        assert!(input.created_to.is_none());
        assert!(input.agent_id.is_none());
    }

    #[test]
    fn rejects_malformed_date() {
        let params = BookingsParams {
            to: Some("01/10/2026".into()),
            ..BookingsParams::default()
        };

        let err = params.into_filter_input().unwrap_err();

        assert_eq!(err.code, "INVALID_DATE");
    }
}
