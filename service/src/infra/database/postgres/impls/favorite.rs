//! [`Favorite`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{favorite, user, Favorite},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::property;

impl<C> Database<Select<By<Option<Favorite>, favorite::Key>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Favorite>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Favorite>, favorite::Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        let favorite::Key {
            user_id,
            property_id,
        } = by.into_inner();

        const SQL: &str = "\
            SELECT added_at \
            FROM favorites \
            WHERE user_id = $1::UUID \
              AND property_id = $2::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&user_id, &property_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Favorite {
                user_id,
                property_id,
                added_at: row.get("added_at"),
            }))
    }
}

impl<C> Database<Select<By<read::favorite::IsFavorite, favorite::Key>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<Favorite>, favorite::Key>>,
        Ok = Option<Favorite>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = read::favorite::IsFavorite;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::favorite::IsFavorite, favorite::Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        let key: favorite::Key = by.into_inner();
        self.execute(Select(By::<Option<Favorite>, _>::new(key)))
            .await
            .map_err(tracerr::wrap!())
            .map(|f| read::favorite::IsFavorite(f.is_some()))
    }
}

impl<C> Database<Insert<Favorite>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(favorite): Insert<Favorite>,
    ) -> Result<Self::Ok, Self::Err> {
        let Favorite {
            user_id,
            property_id,
            added_at,
        } = favorite;

        const SQL: &str = "\
            INSERT INTO favorites (user_id, property_id, added_at) \
            VALUES ($1::UUID, $2::UUID, $3::TIMESTAMPTZ)";
        self.exec(SQL, &[&user_id, &property_id, &added_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Favorite, favorite::Key>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Favorite, favorite::Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        let favorite::Key {
            user_id,
            property_id,
        } = by.into_inner();

        const SQL: &str = "\
            DELETE FROM favorites \
            WHERE user_id = $1::UUID \
              AND property_id = $2::UUID";
        self.exec(SQL, &[&user_id, &property_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<read::favorite::List, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::favorite::List;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::favorite::List, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        let sql = format!(
            "SELECT {columns} \
             FROM favorites f \
             INNER JOIN properties p ON p.id = f.property_id \
             WHERE f.user_id = $1::UUID \
             ORDER BY f.added_at DESC, \
                      f.property_id ASC",
            columns = property::COLUMNS,
        );
        Ok(self
            .query(&sql, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(property::from_row)
            .collect::<Vec<_>>()
            .into())
    }
}
