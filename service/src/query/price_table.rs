//! [`PriceTable`] [`Query`] definition.

use std::convert::Infallible;

use common::operations::{By, Select};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::pricing,
    infra::{database, Database},
    Query, Service,
};

/// [`Query`] resolving the [`pricing::PriceTable`] agents are quoted with.
///
/// Never fails: if the catalog cannot be read, the
/// [`pricing::PriceTable::fallback()`] is returned instead.
#[derive(Clone, Copy, Debug, Default)]
pub struct PriceTable;

impl<Db> Query<PriceTable> for Service<Db>
where
    Db: Database<
        Select<By<pricing::PriceTable, pricing::Category>>,
        Ok = pricing::PriceTable,
        Err = Traced<database::Error>,
    >,
{
    type Ok = pricing::PriceTable;
    type Err = Infallible;

    async fn execute(&self, _: PriceTable) -> Result<Self::Ok, Self::Err> {
        Ok(self.price_table().await)
    }
}

impl<Db> Service<Db>
where
    Db: Database<
        Select<By<pricing::PriceTable, pricing::Category>>,
        Ok = pricing::PriceTable,
        Err = Traced<database::Error>,
    >,
{
    /// Reads the [`pricing::Category::AGENT_GROUP`] prices, falling back to
    /// the [`pricing::PriceTable::fallback()`] on a [`Database`] error.
    pub(crate) async fn price_table(&self) -> pricing::PriceTable {
        let category = pricing::Category::AGENT_GROUP;
        match self.database().execute(Select(By::new(category))).await {
            Ok(table) => table,
            Err(e) => {
                log::warn!(
                    category = category.name(),
                    "failed to read service prices, using fallback: {e}",
                );
                pricing::PriceTable::fallback()
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, Money};

    use crate::{
        domain::pricing::{self, PriceKey, ServicePrice},
        infra::database::mock::{self, Mock},
        Query as _,
    };

    use super::PriceTable;

    #[tokio::test]
    async fn reads_catalog() {
        let db = Mock::default();
        let table = pricing::PriceTable::new([(
            PriceKey::Transit,
            ServicePrice {
                sell_price: Money::from_rupiah(60_000),
                additional_price: Money::ZERO,
            },
        )]);
        db.execute(Insert(table.clone())).await.unwrap();

        let got = mock::service(db).execute(PriceTable).await.unwrap();

        assert_eq!(got, table);
    }

    #[tokio::test]
    async fn empty_catalog_is_not_replaced() {
        let db = Mock::default();
        db.execute(Insert(pricing::PriceTable::default())).await.unwrap();

        let got = mock::service(db).execute(PriceTable).await.unwrap();

        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn falls_back_on_database_error() {
        let db = Mock::default();
        db.fail_on(mock::Op::SelectPriceTable);

        let got = mock::service(db).execute(PriceTable).await.unwrap();

        assert_eq!(got, pricing::PriceTable::fallback());
    }
}
