//! [`Command`] for recording a [`Property`] view.

use common::{
    operations::{
        By, Commit, Delete, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::recently_viewed::Capacity;
use crate::{
    domain::{property, recently_viewed, user, Property, RecentlyViewed, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording a [`Property`] view by a [`User`].
///
/// Keeps only the most recent [`RecentlyViewed`] records of the [`User`],
/// up to the configured [`Capacity`].
#[derive(Clone, Copy, Debug)]
pub struct RecordPropertyView {
    /// ID of the [`User`] viewing the [`Property`].
    pub user_id: user::Id,

    /// ID of the viewed [`Property`].
    pub property_id: property::Id,
}

impl<Db> Command<RecordPropertyView> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<User, user::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Update<RecentlyViewed>, Err = Traced<database::Error>>
        + Database<
            Delete<By<RecentlyViewed, recently_viewed::Overflow>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RecordPropertyView,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecordPropertyView {
            user_id,
            property_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize concurrent views of the same `User`.
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

        tx.execute(Update(RecentlyViewed {
            user_id,
            property_id,
            viewed_at: DateTime::now().coerce(),
        }))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
        .map(drop)?;

        tx.execute(Delete(By::new(recently_viewed::Overflow {
            user_id,
            capacity: self.config().recently_viewed_capacity,
        })))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
        .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)
    }
}

/// Error of [`RecordPropertyView`] [`Command`] execution.
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
    use std::collections::HashSet;

    use crate::{
        command::create_property::spec::listing,
        domain::{property, recently_viewed, user},
        query,
        spec::{service, service_with_capacity},
        Command as _,
    };

    use super::{ExecutionError, RecordPropertyView};

    #[tokio::test]
    async fn keeps_most_recent_within_capacity() {
        let capacity = recently_viewed::Capacity::new(3).unwrap();
        let svc = service_with_capacity(capacity);
        let user_id = user::Id::new();

        let mut viewed = vec![];
        for i in 0..5 {
            let p = svc.execute(listing("Sydney", 100 + i)).await.unwrap();
            svc.execute(RecordPropertyView {
                user_id,
                property_id: p.id,
            })
            .await
            .unwrap();
            viewed.push(p.id);
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let list = svc
            .execute(query::recently_viewed::List {
                user_id,
                limit: Some(10),
            })
            .await
            .unwrap();

        let ids = list.iter().map(|e| e.property_id).collect::<Vec<_>>();
        let expected = viewed.iter().rev().take(3).copied().collect::<Vec<_>>();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn repeated_view_moves_to_front_without_duplicates() {
        let svc = service();
        let user_id = user::Id::new();
        let first = svc.execute(listing("Perth", 1)).await.unwrap();
        let second = svc.execute(listing("Perth", 2)).await.unwrap();

        for id in [first.id, second.id, first.id] {
            svc.execute(RecordPropertyView {
                user_id,
                property_id: id,
            })
            .await
            .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let list = svc
            .execute(query::recently_viewed::List {
                user_id,
                limit: None,
            })
            .await
            .unwrap();

        let ids = list.iter().map(|e| e.property_id).collect::<Vec<_>>();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
        assert!(list[0].viewed_at >= list[1].viewed_at);
    }

    #[tokio::test]
    async fn unknown_property_writes_nothing() {
        let svc = service();
        let user_id = user::Id::new();
        let missing = property::Id::new();

        let err = svc
            .execute(RecordPropertyView {
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
            .execute(query::recently_viewed::List {
                user_id,
                limit: None,
            })
            .await
            .unwrap()
            .is_empty());
    }
}
