//! [`Discount`]-related [`Database`] implementations.

use common::operations::{By, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{user, Discount},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<Discount>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Discount>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Discount>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();

        const SQL: &str = "\
            SELECT kind, value, is_active, updated_at \
            FROM discounts \
            WHERE user_id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Discount {
                user_id,
                kind: row.get("kind"),
                value: row.get("value"),
                is_active: row.get("is_active"),
                updated_at: row.get("updated_at"),
            }))
    }
}

impl<C> Database<Update<Discount>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(discount): Update<Discount>,
    ) -> Result<Self::Ok, Self::Err> {
        let Discount {
            user_id,
            kind,
            value,
            is_active,
            updated_at,
        } = discount;

        const SQL: &str = "\
            INSERT INTO discounts (\
                user_id, kind, value, is_active, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::INT2, $3::NUMERIC, $4::BOOLEAN, \
                $5::TIMESTAMPTZ\
            ) \
            ON CONFLICT (user_id) DO UPDATE \
            SET kind = EXCLUDED.kind, \
                value = EXCLUDED.value, \
                is_active = EXCLUDED.is_active, \
                updated_at = EXCLUDED.updated_at";
        self.exec(SQL, &[&user_id, &kind, &value, &is_active, &updated_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
