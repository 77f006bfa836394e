//! [`Booking`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{booking, payment, pricing, travel, user, Booking},
    infra::{
        database::{
            self,
            postgres::{Connection, FuzzPattern},
            Postgres,
        },
        Database,
    },
    read,
};

/// Columns of the `bookings` table a [`Booking`] is built from.
const COLUMNS: &str = "\
    id, user_id, passengers, travel_types, baggage, \
    pickup_area, dropoff_area, customer_name, customer_phone, \
    flight_number, flight_date, notes, \
    unit_price, baggage_price, subtotal, discount, total, \
    payment_method, bank, payment_status, status, created_at";

/// Builds a [`Booking`] out of the provided [`Row`] of [`COLUMNS`].
fn from_row(row: &Row) -> Booking {
    let passengers = u16::try_from(row.get::<_, i32>("passengers"))
        .ok()
        .and_then(booking::Passengers::new)
        .expect("valid `booking::Passengers`");
    let baggage = u16::try_from(row.get::<_, i32>("baggage"))
        .expect("valid `booking::BaggageCount`");
    Booking {
        id: row.get("id"),
        user_id: row.get("user_id"),
        details: booking::Details {
            passengers,
            selection: travel::Selection::of(
                row.get::<_, Vec<travel::Type>>("travel_types"),
            ),
            baggage,
            pickup_area: row.get("pickup_area"),
            dropoff_area: row.get("dropoff_area"),
            customer_name: row.get("customer_name"),
            customer_phone: row.get("customer_phone"),
            flight_number: row.get("flight_number"),
            flight_date: row.get("flight_date"),
            notes: row.get("notes"),
        },
        price: pricing::Quote {
            unit_price: row.get("unit_price"),
            baggage_price: row.get("baggage_price"),
            subtotal: row.get("subtotal"),
            discount: row.get("discount"),
            total: row.get("total"),
        },
        payment_method: row.get("payment_method"),
        bank: row.get("bank"),
        payment_status: row.get("payment_status"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}

/// SQL parameters of a [`read::booking::list::Filter`].
struct FilterParams {
    /// ID of the agent [`user::Id`] to filter by.
    user_id: Option<user::Id>,

    /// [`booking::Status`]es to include.
    statuses: Vec<booking::Status>,

    /// [`payment::Status`]es to include.
    payment_statuses: Vec<payment::Status>,

    /// [`travel::Type`] to include.
    travel_type: Option<travel::Type>,

    /// [`FuzzPattern`] of the customer name.
    customer_name: Option<FuzzPattern>,

    /// Start of the creation range.
    created_from: Option<booking::CreationDateTime>,

    /// End of the creation range.
    created_to: Option<booking::CreationDateTime>,
}

impl From<read::booking::list::Filter> for FilterParams {
    fn from(filter: read::booking::list::Filter) -> Self {
        let read::booking::list::Filter {
            user_id,
            statuses,
            payment_statuses,
            travel_type,
            customer_name,
            created_from,
            created_to,
        } = filter;
        Self {
            user_id,
            statuses,
            payment_statuses,
            travel_type,
            customer_name: customer_name
                .map(|n| FuzzPattern::new(&n.to_string())),
            created_from: created_from.map(|d| d.start()),
            created_to: created_to.map(|d| d.end()),
        }
    }
}

impl FilterParams {
    /// Pushes these [`FilterParams`] into the provided `ps` and returns the
    /// SQL conditions referring them, each prefixed with `AND`.
    fn push<'a>(&'a self, ps: &mut Vec<&'a (dyn ToSql + Sync)>) -> String {
        let mut conds = vec![];
        if let Some(id) = &self.user_id {
            ps.push(id);
            conds.push(format!("user_id = ${}::UUID", ps.len()));
        }
        if !self.statuses.is_empty() {
            ps.push(&self.statuses);
            conds.push(format!("status = ANY(${}::INT2[])", ps.len()));
        }
        if !self.payment_statuses.is_empty() {
            ps.push(&self.payment_statuses);
            conds.push(format!("payment_status = ANY(${}::INT2[])", ps.len()));
        }
        if let Some(ty) = &self.travel_type {
            ps.push(ty);
            conds.push(format!("${}::INT2 = ANY(travel_types)", ps.len()));
        }
        if let Some(pattern) = &self.customer_name {
            ps.push(pattern);
            conds.push(format!(
                "LOWER(customer_name) SIMILAR TO LOWER(${}::VARCHAR)",
                ps.len(),
            ));
        }
        if let Some(from) = &self.created_from {
            ps.push(from);
            conds.push(format!("created_at >= ${}::TIMESTAMPTZ", ps.len()));
        }
        if let Some(to) = &self.created_to {
            ps.push(to);
            conds.push(format!("created_at <= ${}::TIMESTAMPTZ", ps.len()));
        }
        conds
            .iter()
            .format_with(" ", |c, f| f(&format_args!("AND {c}")))
            .to_string()
    }
}

impl<C, IDs> Database<Select<By<HashMap<booking::Id, Booking>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[booking::Id]>,
{
    type Ok = HashMap<booking::Id, Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<booking::Id, Booking>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[booking::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
             WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
             LIMIT $2::INT4",
        );
        Ok(self
            .query(&sql, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let booking = from_row(row);
                (booking.id, booking)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Booking>, booking::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<booking::Id, Booking>, [booking::Id; 1]>>,
        Ok = HashMap<booking::Id, Booking>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Insert<Booking>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Booking>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(booking)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let Booking {
            id,
            user_id,
            details:
                booking::Details {
                    passengers,
                    selection,
                    baggage,
                    pickup_area,
                    dropoff_area,
                    customer_name,
                    customer_phone,
                    flight_number,
                    flight_date,
                    notes,
                },
            price:
                pricing::Quote {
                    unit_price,
                    baggage_price,
                    subtotal,
                    discount,
                    total,
                },
            payment_method,
            bank,
            payment_status,
            status,
            created_at,
        } = booking;
        let passengers = i32::from(passengers.get());
        let travel_types = selection.types().collect::<Vec<_>>();
        let baggage = i32::from(baggage);

        const SQL: &str = "\
            INSERT INTO bookings (\
                id, user_id, passengers, travel_types, baggage, \
                pickup_area, dropoff_area, customer_name, customer_phone, \
                flight_number, flight_date, notes, \
                unit_price, baggage_price, subtotal, discount, total, \
                payment_method, bank, payment_status, status, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::INT4, $4::INT2[], $5::INT4, \
                $6::VARCHAR, $7::VARCHAR, $8::VARCHAR, $9::VARCHAR, \
                $10::VARCHAR, $11::DATE, $12::VARCHAR, \
                $13::NUMERIC, $14::NUMERIC, $15::NUMERIC, $16::NUMERIC, \
                $17::NUMERIC, \
                $18::INT2, $19::INT2, $20::INT2, $21::INT2, \
                $22::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET payment_method = EXCLUDED.payment_method, \
                bank = EXCLUDED.bank, \
                payment_status = EXCLUDED.payment_status, \
                status = EXCLUDED.status";
        self.exec(
            SQL,
            &[
                &id,
                &user_id,
                &passengers,
                &travel_types,
                &baggage,
                &pickup_area,
                &dropoff_area,
                &customer_name,
                &customer_phone,
                &flight_number,
                &flight_date,
                &notes,
                &unit_price,
                &baggage_price,
                &subtotal,
                &discount,
                &total,
                &payment_method,
                &bank,
                &payment_status,
                &status,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Booking, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO bookings_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<
        Select<By<read::booking::list::Page, read::booking::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::booking::list::Page, read::booking::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::list::Selector { arguments, filter } =
            by.into_inner();
        let filter = FilterParams::from(filter);

        let limit = i32::try_from(arguments.limit()).unwrap() + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];
        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });
        let filtering = filter.push(&mut ps);

        let sql = format!(
            "SELECT id \
             FROM bookings \
             WHERE TRUE \
                   {cursor} \
                   {filtering} \
             ORDER BY id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = arguments.kind().operator();
                f(&format_args!("AND id {op} ${idx}::UUID"))
            }),
            order = arguments.kind().order().sql(),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let edges = rows
            .into_iter()
            .take(arguments.limit())
            .map(|row| {
                let id = row.get("id");
                (id, id)
            })
            .collect::<Vec<_>>();

        Ok(read::booking::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C>
    Database<
        Select<
            By<read::booking::list::TotalCount, read::booking::list::Filter>,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::booking::list::TotalCount, read::booking::list::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = FilterParams::from(by.into_inner());

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let sql = format!(
            "SELECT COUNT(*)::INT4 \
             FROM bookings \
             WHERE TRUE {}",
            filter.push(&mut ps),
        );
        self.query_opt(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i32>(0).into())
    }
}

impl<C> Database<Select<By<Vec<Booking>, read::booking::list::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, read::booking::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = FilterParams::from(by.into_inner());

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
             WHERE TRUE {} \
             ORDER BY id DESC",
            filter.push(&mut ps),
        );
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}
