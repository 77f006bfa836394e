//! Wallet ledger [`Entry`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tracerr::Traced;

use crate::{
    domain::ledger::Entry,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C> Database<Insert<Entry>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(entry): Insert<Entry>,
    ) -> Result<Self::Ok, Self::Err> {
        let Entry {
            id,
            user_id,
            kind,
            amount,
            balance_after,
            description,
            created_at,
        } = entry;

        const SQL: &str = "\
            INSERT INTO ledger_entries (\
                id, user_id, kind, amount, balance_after, description, \
                created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::INT2, $4::NUMERIC, $5::NUMERIC, \
                $6::VARCHAR, $7::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &user_id,
                &kind,
                &amount,
                &balance_after,
                &description,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C>
    Database<
        Select<By<read::ledger::list::Page, read::ledger::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::ledger::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::ledger::list::Page, read::ledger::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::ledger::list::Selector {
            arguments,
            filter: read::ledger::list::Filter { user_id },
        } = by.into_inner();

        let limit = i32::try_from(arguments.limit()).unwrap() + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];
        ps.push(&user_id);
        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });

        let sql = format!(
            "SELECT id, kind, amount, balance_after, description, created_at \
             FROM ledger_entries \
             WHERE user_id = $2::UUID \
                   {cursor} \
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
                let entry = Entry {
                    id: row.get("id"),
                    user_id,
                    kind: row.get("kind"),
                    amount: row.get("amount"),
                    balance_after: row.get("balance_after"),
                    description: row.get("description"),
                    created_at: row.get("created_at"),
                };
                (entry.id, entry)
            })
            .collect::<Vec<_>>();

        Ok(read::ledger::list::Page::new(&arguments, edges, has_more))
    }
}
