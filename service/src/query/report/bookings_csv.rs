//! [`BookingsCsv`] definition.

use common::{
    operations::{By, Select},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::Booking,
    infra::{database, Database},
    read, Query, Service,
};

/// Header row of a [`BookingsCsv`] report.
const HEADER: [&str; 10] = [
    "Booking ID",
    "Customer Name",
    "Travel Type",
    "Passengers",
    "Payment Method",
    "Payment Status",
    "Total",
    "Status",
    "Created At",
    "Departure Date",
];

/// [`Query`] exporting [`Booking`]s passing a filter as a CSV file.
#[derive(Clone, Debug)]
pub struct BookingsCsv {
    /// Filter the exported [`Booking`]s should pass.
    pub filter: read::booking::list::Filter,

    /// Current [`Date`] the export file is named after.
    pub today: Date,
}

/// Output of the [`BookingsCsv`] [`Query`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    /// Name of the exported file.
    pub filename: String,

    /// CSV contents of the exported file.
    pub bytes: Vec<u8>,
}

impl<Db> Query<BookingsCsv> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Booking>, read::booking::list::Filter>>,
        Ok = Vec<Booking>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        BookingsCsv { filter, today }: BookingsCsv,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let bookings = self
            .database()
            .execute(Select(By::new(filter)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let bytes = render(&bookings).map_err(tracerr::from_and_wrap!(=> E))?;

        Ok(Output {
            filename: format!("booking-data-{today}.csv"),
            bytes,
        })
    }
}

/// Renders the provided [`Booking`]s as CSV rows under the [`HEADER`].
fn render(bookings: &[Booking]) -> Result<Vec<u8>, csv::Error> {
    let mut w = csv::Writer::from_writer(vec![]);
    w.write_record(HEADER)?;
    for b in bookings {
        w.write_record([
            b.id.to_string(),
            b.details.customer_name.to_string(),
            b.details.selection.label(),
            b.details.passengers.to_string(),
            b.payment_method.label().to_owned(),
            b.payment_status.label().to_owned(),
            b.price.total.rupiah().to_string(),
            b.status.label().to_owned(),
            b.created_at.date().to_string(),
            b.details.flight_date.to_string(),
        ])?;
    }
    w.into_inner().map_err(|e| e.into_error().into())
}

/// Error of [`BookingsCsv`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// CSV serialization error.
    #[display("Failed to write CSV: {_0}")]
    Csv(csv::Error),
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, Date, DateTime, Money};

    use crate::{
        domain::{
            booking::{self, CustomerName, Details, Passengers},
            payment, pricing,
            travel::{Selection, Type},
            user, Booking,
        },
        infra::database::mock::{self, Mock},
        read::booking::list::Filter,
        Query as _,
    };

    use super::BookingsCsv;

    fn booking(name: &str, status: booking::Status) -> Booking {
        let total = Money::from_rupiah(1_234_000);
        Booking {
            id: booking::Id::new(),
            user_id: user::Id::new(),
            details: Details {
                passengers: Passengers::new(4).unwrap(),
                selection: Selection::of([Type::Arrival, Type::Departure]),
                baggage: 0,
                pickup_area: None,
                dropoff_area: None,
                customer_name: CustomerName::new(name).unwrap(),
                customer_phone: user::Phone::new("081234567890").unwrap(),
                flight_number: None,
                flight_date: Date::from_ymd(2026, 12, 24).unwrap(),
                notes: None,
            },
            price: pricing::Quote {
                unit_price: Money::ZERO,
                baggage_price: Money::ZERO,
                subtotal: total,
                discount: Money::ZERO,
                total,
            },
            payment_method: payment::Method::BankTransfer,
            bank: Some(payment::Bank::Bca),
            payment_status: payment::Status::Pending,
            status,
            created_at: DateTime::now().coerce(),
        }
    }

    #[tokio::test]
    async fn exports_filtered_bookings() {
        let db = Mock::default();
        let kept = booking("Siti, Aminah", booking::Status::Confirmed);
        db.execute(Insert(kept.clone())).await.unwrap();
        db.execute(Insert(booking("Budi", booking::Status::Cancelled)))
            .await
            .unwrap();
        let today = Date::from_ymd(2026, 10, 18).unwrap();

        let out = mock::service(db)
            .execute(BookingsCsv {
                filter: Filter {
                    statuses: vec![booking::Status::Confirmed],
                    ..Filter::default()
                },
                today,
            })
            .await
            .unwrap();

        assert_eq!(out.filename, "booking-data-2026-10-18.csv");
        let csv = String::from_utf8(out.bytes).unwrap();
        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Booking ID,Customer Name,"));
        assert_eq!(
            lines[1],
            format!(
                "{},\"Siti, Aminah\",Arrival + Departure,4,Bank transfer,\
                 Pending,Rp 1.234.000,Confirmed,{},2026-12-24",
                kept.id,
                kept.created_at.date(),
            ),
        );
    }
}
