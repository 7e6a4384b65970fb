//! In-memory [`Database`] implementation.
//!
//! Every operation is applied immediately under a single [`RwLock`], so
//! [`Transact`] and [`Commit`] are no-ops and a [`Lock`] never blocks.

use std::{collections::HashMap, sync::Arc};

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use derive_more::{Display, Error as StdError};
use tokio::sync::RwLock;
use tracerr::Traced;

use crate::{
    domain::{
        favorite, property, recently_viewed, user, Favorite, Property,
        RecentlyViewed, User,
    },
    infra::{database, Database},
    read,
};

/// In-memory [`Database`].
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<RwLock<State>>);

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Stored data of a [`Memory`] database.
#[derive(Debug, Default)]
struct State {
    /// Stored [`User`]s.
    users: HashMap<user::Id, User>,

    /// Stored [`Property`]s.
    properties: HashMap<property::Id, Property>,

    /// Stored [`Favorite`]s.
    favorites: HashMap<favorite::Key, Favorite>,

    /// Stored [`RecentlyViewed`] records.
    views: HashMap<(user::Id, property::Id), RecentlyViewed>,
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Unique constraint is violated.
    #[display("Unique constraint `{_0}` is violated")]
    UniqueViolation(#[error(not(source))] &'static str),
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Lock<By<User, user::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.read().await.users.get(&by.into_inner()).cloned())
    }
}

impl<'l> Database<Select<By<Option<User>, &'l user::Email>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(self
            .0
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == *email)
            .cloned())
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.write().await;
        if state
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(tracerr::new!(database::Error::from(
                Error::UniqueViolation(database::USERS_EMAIL_CONSTRAINT)
            )));
        }
        drop(state.users.insert(user.id, user));
        Ok(())
    }
}

impl Database<Insert<Property>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.0.write().await.properties.insert(property.id, property));
        Ok(())
    }
}

impl Database<Select<By<Option<Property>, property::Id>>> for Memory {
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.read().await.properties.get(&by.into_inner()).cloned())
    }
}

impl
    Database<
        Select<
            By<read::property::list::TotalCount, read::property::list::Filter>,
        >,
    > for Memory
{
    type Ok = read::property::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::property::list::TotalCount, read::property::list::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let count = self
            .0
            .read()
            .await
            .properties
            .values()
            .filter(|p| filter.matches(p))
            .count();
        Ok(read::property::list::TotalCount::from(count as u64))
    }
}

impl Database<Select<By<Vec<Property>, read::property::list::Selector>>>
    for Memory
{
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Property>, read::property::list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::property::list::Selector {
            arguments,
            filter,
            sort,
        } = by.into_inner();

        let state = self.0.read().await;
        let mut matched = state
            .properties
            .values()
            .filter(|p| filter.matches(p))
            .collect::<Vec<_>>();
        matched.sort_by(|a, b| sort.compare(a, b));

        Ok(matched
            .into_iter()
            .skip(usize::try_from(arguments.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(arguments.limit()).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}

impl Database<Select<By<Option<Favorite>, favorite::Key>>> for Memory {
    type Ok = Option<Favorite>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Favorite>, favorite::Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.read().await.favorites.get(&by.into_inner()).copied())
    }
}

impl Database<Select<By<read::favorite::IsFavorite, favorite::Key>>>
    for Memory
{
    type Ok = read::favorite::IsFavorite;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::favorite::IsFavorite, favorite::Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        let key = by.into_inner();
        let is_favorite = self.0.read().await.favorites.contains_key(&key);
        Ok(read::favorite::IsFavorite(is_favorite))
    }
}

impl Database<Insert<Favorite>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(favorite): Insert<Favorite>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.write().await;
        if state.favorites.contains_key(&favorite.key()) {
            return Err(tracerr::new!(database::Error::from(
                Error::UniqueViolation(database::FAVORITES_KEY_CONSTRAINT)
            )));
        }
        drop(state.favorites.insert(favorite.key(), favorite));
        Ok(())
    }
}

impl Database<Delete<By<Favorite, favorite::Key>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Favorite, favorite::Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.0.write().await.favorites.remove(&by.into_inner()));
        Ok(())
    }
}

impl Database<Select<By<read::favorite::List, user::Id>>> for Memory {
    type Ok = read::favorite::List;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::favorite::List, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();

        let state = self.0.read().await;
        let mut favorites = state
            .favorites
            .values()
            .filter(|f| f.user_id == user_id)
            .collect::<Vec<_>>();
        favorites.sort_by(|a, b| {
            b.added_at
                .cmp(&a.added_at)
                .then_with(|| a.property_id.cmp(&b.property_id))
        });

        Ok(favorites
            .into_iter()
            .filter_map(|f| state.properties.get(&f.property_id).cloned())
            .collect::<Vec<_>>()
            .into())
    }
}

impl Database<Update<RecentlyViewed>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(view): Update<RecentlyViewed>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(
            self.0
                .write()
                .await
                .views
                .insert((view.user_id, view.property_id), view),
        );
        Ok(())
    }
}

impl Database<Delete<By<RecentlyViewed, recently_viewed::Overflow>>>
    for Memory
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<RecentlyViewed, recently_viewed::Overflow>>,
    ) -> Result<Self::Ok, Self::Err> {
        let recently_viewed::Overflow { user_id, capacity } = by.into_inner();

        let mut state = self.0.write().await;
        let mut views = state
            .views
            .values()
            .filter(|v| v.user_id == user_id)
            .copied()
            .collect::<Vec<_>>();
        views.sort_by(|a, b| {
            b.viewed_at
                .cmp(&a.viewed_at)
                .then_with(|| a.property_id.cmp(&b.property_id))
        });

        for v in views.into_iter().skip(usize::from(capacity.get())) {
            drop(state.views.remove(&(v.user_id, v.property_id)));
        }
        Ok(())
    }
}

impl
    Database<
        Select<
            By<
                Vec<read::recently_viewed::Entry>,
                read::recently_viewed::Selector,
            >,
        >,
    > for Memory
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

        let state = self.0.read().await;
        let mut views = state
            .views
            .values()
            .filter(|v| v.user_id == user_id)
            .collect::<Vec<_>>();
        views.sort_by(|a, b| {
            b.viewed_at
                .cmp(&a.viewed_at)
                .then_with(|| a.property_id.cmp(&b.property_id))
        });

        Ok(views
            .into_iter()
            .filter_map(|v| {
                let property = state.properties.get(&v.property_id)?.clone();
                Some(read::recently_viewed::Entry {
                    property_id: v.property_id,
                    viewed_at: v.viewed_at,
                    property,
                })
            })
            .take(usize::from(limit))
            .collect())
    }
}
