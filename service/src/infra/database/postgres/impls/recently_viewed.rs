//! [`RecentlyViewed`]-related [`Database`] implementations.

use common::operations::{By, Delete, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{recently_viewed, RecentlyViewed},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::property;

impl<C> Database<Update<RecentlyViewed>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(view): Update<RecentlyViewed>,
    ) -> Result<Self::Ok, Self::Err> {
        let RecentlyViewed {
            user_id,
            property_id,
            viewed_at,
        } = view;

        const SQL: &str = "\
            INSERT INTO recently_viewed (user_id, property_id, viewed_at) \
            VALUES ($1::UUID, $2::UUID, $3::TIMESTAMPTZ) \
            ON CONFLICT (user_id, property_id) DO UPDATE \
            SET viewed_at = EXCLUDED.viewed_at";
        self.exec(SQL, &[&user_id, &property_id, &viewed_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<RecentlyViewed, recently_viewed::Overflow>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<RecentlyViewed, recently_viewed::Overflow>>,
    ) -> Result<Self::Ok, Self::Err> {
        let recently_viewed::Overflow { user_id, capacity } = by.into_inner();
        let capacity = i64::from(capacity.get());

        const SQL: &str = "\
            DELETE FROM recently_viewed \
            WHERE user_id = $1::UUID \
              AND property_id IN (\
                  SELECT property_id \
                  FROM recently_viewed \
                  WHERE user_id = $1::UUID \
                  ORDER BY viewed_at DESC, \
                           property_id ASC \
                  OFFSET $2::INT8\
              )";
        self.exec(SQL, &[&user_id, &capacity])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<
        Select<
            By<
                Vec<read::recently_viewed::Entry>,
                read::recently_viewed::Selector,
            >,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<read::recently_viewed::Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                Vec<read::recently_viewed::Entry>,
                read::recently_viewed::Selector,
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::recently_viewed::Selector { user_id, limit } =
            by.into_inner();
        let limit = i64::from(limit);

        let sql = format!(
            "SELECT r.viewed_at, {columns} \
             FROM recently_viewed r \
             INNER JOIN properties p ON p.id = r.property_id \
             WHERE r.user_id = $1::UUID \
             ORDER BY r.viewed_at DESC, \
                      r.property_id ASC \
             LIMIT $2::INT8",
            columns = property::COLUMNS,
        );
        Ok(self
            .query(&sql, &[&user_id, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let property = property::from_row(row);
                read::recently_viewed::Entry {
                    property_id: property.id,
                    viewed_at: row.get("viewed_at"),
                    property,
                }
            })
            .collect())
    }
}
