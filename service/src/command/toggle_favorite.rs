//! [`Command`] for toggling a [`Favorite`].

use common::{
    operations::{
        By, Commit, Delete, Insert, Lock, Select, Transact, Transacted,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{favorite, property, user, Favorite, Property, User},
    infra::{database, Database},
    read::favorite::IsFavorite,
    Service,
};

use super::Command;

/// [`Command`] for toggling a [`Favorite`].
///
/// Removes the [`Favorite`] if it exists, or adds it otherwise.
#[derive(Clone, Copy, Debug)]
pub struct ToggleFavorite {
    /// ID of the [`User`] toggling the [`Favorite`].
    pub user_id: user::Id,

    /// ID of the [`Property`] to toggle.
    pub property_id: property::Id,
}

impl<Db> Command<ToggleFavorite> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<User, user::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Favorite>, favorite::Key>>,
            Ok = Option<Favorite>,
            Err = Traced<database::Error>,
        > + Database<Insert<Favorite>, Err = Traced<database::Error>>
        + Database<
            Delete<By<Favorite, favorite::Key>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = IsFavorite;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ToggleFavorite,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ToggleFavorite {
            user_id,
            property_id,
        } = cmd;
        let key = favorite::Key {
            user_id,
            property_id,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize concurrent toggles of the same `User`.
        tx.execute(Lock(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        drop(
            tx.execute(Select(By::<Option<Property>, _>::new(property_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::PropertyNotExists(property_id))
                .map_err(tracerr::wrap!())?,
        );

        let existing = tx
            .execute(Select(By::<Option<Favorite>, _>::new(key)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let is_favorite = if existing.is_some() {
            tx.execute(Delete(By::<Favorite, _>::new(key)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            false
        } else {
            tx.execute(Insert(Favorite {
                user_id,
                property_id,
                added_at: DateTime::now().coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
            true
        };

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(IsFavorite(is_favorite))
    }
}

/// Error of [`ToggleFavorite`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::create_property::spec::listing,
        domain::{favorite, property, user},
        query,
        spec::service,
        Command as _,
    };

    use super::{ExecutionError, ToggleFavorite};

    #[tokio::test]
    async fn double_toggle_is_identity() {
        let svc = service();
        let user_id = user::Id::new();
        let property = svc.execute(listing("Sydney", 1)).await.unwrap();
        let cmd = ToggleFavorite {
            user_id,
            property_id: property.id,
        };
        let check = || {
            query::favorite::Check::by(favorite::Key {
                user_id,
                property_id: property.id,
            })
        };

        assert_eq!(svc.execute(check()).await.unwrap(), false);

        assert_eq!(svc.execute(cmd).await.unwrap(), true);
        assert_eq!(svc.execute(check()).await.unwrap(), true);

        assert_eq!(svc.execute(cmd).await.unwrap(), false);
        assert_eq!(svc.execute(check()).await.unwrap(), false);
        assert!(svc
            .execute(query::favorites::List::by(user_id))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_property() {
        let svc = service();
        let user_id = user::Id::new();
        let missing = property::Id::new();

        let err = svc
            .execute(ToggleFavorite {
                user_id,
                property_id: missing,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::PropertyNotExists(id) if *id == missing,
        ));
        assert!(svc
            .execute(query::favorites::List::by(user_id))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn favorites_are_per_user() {
        let svc = service();
        let (alice, bob) = (user::Id::new(), user::Id::new());
        let property = svc.execute(listing("Perth", 1)).await.unwrap();

        _ = svc
            .execute(ToggleFavorite {
                user_id: alice,
                property_id: property.id,
            })
            .await
            .unwrap();

        let alice_list =
            svc.execute(query::favorites::List::by(alice)).await.unwrap();
        assert_eq!(alice_list.len(), 1);
        assert_eq!(alice_list[0].id, property.id);
        assert!(svc
            .execute(query::favorites::List::by(bob))
            .await
            .unwrap()
            .is_empty());
    }
}
