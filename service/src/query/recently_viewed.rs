//! [`Query`] collection related to [`RecentlyViewed`] records.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{recently_viewed::Capacity, Property, RecentlyViewed};
use crate::{
    domain::user,
    infra::{database, Database},
    read::recently_viewed::{Entry, Selector},
    Service,
};

use super::Query;

/// [`Query`] listing the most recently viewed [`Property`]s of a user, the
/// latest view first.
#[derive(Clone, Copy, Debug)]
pub struct List {
    /// ID of the user whose views are listed.
    pub user_id: user::Id,

    /// Maximum number of listed [`Entry`]s.
    ///
    /// [`List::DEFAULT_LIMIT`] is used if [`None`], and anything above the
    /// configured [`Capacity`] is clamped to it.
    pub limit: Option<u16>,
}

impl List {
    /// Default number of listed [`Entry`]s.
    pub const DEFAULT_LIMIT: u16 = 10;
}

impl<Db> Query<List> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Entry>, Selector>>,
        Ok = Vec<Entry>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Entry>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: List) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let List { user_id, limit } = query;

        let limit = limit.unwrap_or(List::DEFAULT_LIMIT);
        if limit == 0 {
            return Err(tracerr::new!(E::ZeroLimit));
        }
        let limit =
            limit.min(self.config().recently_viewed_capacity.get());

        self.database()
            .execute(Select(By::new(Selector { user_id, limit })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`List`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Requested limit is zero.
    #[display("Limit must be greater than 0")]
    ZeroLimit,
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{create_property::spec::listing, RecordPropertyView},
        domain::{recently_viewed, user},
        spec::service_with_capacity,
        Query as _,
    };

    use super::{ExecutionError, List};

    #[tokio::test]
    async fn limit_is_defaulted_and_clamped() {
        let svc =
            service_with_capacity(recently_viewed::Capacity::new(12).unwrap());
        let user_id = user::Id::new();
        for i in 0..15 {
            let p = svc.execute(listing("Darwin", i)).await.unwrap();
            svc.execute(RecordPropertyView {
                user_id,
                property_id: p.id,
            })
            .await
            .unwrap();
        }

        let default = svc
            .execute(List {
                user_id,
                limit: None,
            })
            .await
            .unwrap();
        assert_eq!(default.len(), 10);

        let clamped = svc
            .execute(List {
                user_id,
                limit: Some(500),
            })
            .await
            .unwrap();
        assert_eq!(clamped.len(), 12);

        let single = svc
            .execute(List {
                user_id,
                limit: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].property.id, single[0].property_id);
    }

    #[tokio::test]
    async fn rejects_zero_limit() {
        let svc =
            service_with_capacity(recently_viewed::Capacity::DEFAULT);

        let err = svc
            .execute(List {
                user_id: user::Id::new(),
                limit: Some(0),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ZeroLimit));
    }
}
