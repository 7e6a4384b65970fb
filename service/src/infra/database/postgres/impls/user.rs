//! [`User`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C, IDs> Database<Select<By<HashMap<user::Id, User>, IDs>>> for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[user::Id]>,
{
    type Ok = HashMap<user::Id, User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<user::Id, User>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[user::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap_or(i32::MAX);

        const SQL: &str = "\
            SELECT id, email, password_hash, created_at \
            FROM users \
            WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
            LIMIT $2::INT4";
        Ok(self
            .query(SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let id = row.get("id");
                (
                    id,
                    User {
                        id,
                        email: row.get("email"),
                        password_hash: row.get("password_hash"),
                        created_at: row.get("created_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<user::Id, User>, [user::Id; 1]>>,
        Ok = HashMap<user::Id, User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<'l, C> Database<Select<By<Option<User>, &'l user::Email>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM users \
            WHERE email = $1::VARCHAR \
            LIMIT 1";
        let Some(row) = self
            .query_opt(SQL, &[email])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        self.execute(Select(By::new(row.get::<_, user::Id>("id"))))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<User>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(user)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            email,
            password_hash,
            created_at,
        } = user;

        const SQL: &str = "\
            INSERT INTO users (id, email, password_hash, created_at) \
            VALUES ($1::UUID, $2::VARCHAR, $3::VARCHAR, $4::TIMESTAMPTZ) \
            ON CONFLICT (id) DO UPDATE \
            SET email = EXCLUDED.email, \
                password_hash = EXCLUDED.password_hash, \
                created_at = EXCLUDED.created_at";
        self.exec(SQL, &[&id, &email, &password_hash, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<User, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM users \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
