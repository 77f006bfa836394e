//! [`PriceTable`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{
        pricing::{self, ServicePrice},
        PriceTable,
    },
    infra::{
        database::{
            self,
            postgres::{self, connection, Connection},
            Postgres,
        },
        Database,
    },
};

impl<C> Database<Select<By<PriceTable, pricing::Category>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = PriceTable;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<PriceTable, pricing::Category>>,
    ) -> Result<Self::Ok, Self::Err> {
        let category = by.into_inner().name();

        const SQL: &str = "\
            SELECT key, sell_price, additional_price \
            FROM service_prices \
            WHERE category = $1::VARCHAR";
        let rows = self
            .query(SQL, &[&category])
            .await
            .map_err(tracerr::wrap!())?;

        // Undecodable rows fail the whole lookup, so the caller can fall back.
        let entries = rows
            .iter()
            .map(|row| {
                Ok((
                    row.try_get("key")?,
                    ServicePrice {
                        sell_price: row.try_get("sell_price")?,
                        additional_price: row.try_get("additional_price")?,
                    },
                ))
            })
            .collect::<Result<Vec<_>, connection::Error>>()
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        Ok(PriceTable::new(entries))
    }
}
