//! Endpoints of recently viewed properties.

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{property, recently_viewed},
    query, read, Query as _,
};

use crate::{api, AsError, Error, Service, Session};

/// Recently viewed property.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// ID of the viewed property.
    pub property_id: property::Id,

    /// Time of the latest view.
    pub viewed_at: recently_viewed::ViewDateTime,

    /// Current state of the viewed property.
    pub property: api::property::Property,
}

impl From<read::recently_viewed::Entry> for Entry {
    fn from(e: read::recently_viewed::Entry) -> Self {
        Self {
            property_id: e.property_id,
            viewed_at: e.viewed_at,
            property: e.property.into(),
        }
    }
}

/// Query string of [`list`].
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ListParams {
    /// Maximum number of listed entries.
    pub limit: Option<u16>,
}

/// Records a view of the property by the current user.
///
/// # Errors
///
/// Possible error codes:
/// - `PROPERTY_NOT_EXISTS` - if the property doesn't exist.
#[tracing::instrument(skip_all, fields(user.id = %session.user_id))]
pub async fn track(
    Extension(service): Extension<Service>,
    session: Session,
    WithRejection(Path(property_id), _): WithRejection<
        Path<property::Id>,
        Error,
    >,
) -> Result<StatusCode, Error> {
    service
        .execute(command::RecordPropertyView {
            user_id: session.user_id,
            property_id,
        })
        .await
        .map(|()| StatusCode::OK)
        .map_err(AsError::into_error)
}

/// Lists properties recently viewed by the current user, the latest view
/// first.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_LIMIT` - if the provided `limit` is zero.
#[tracing::instrument(skip_all, fields(user.id = %session.user_id))]
pub async fn list(
    Extension(service): Extension<Service>,
    session: Session,
    WithRejection(Query(params), _): WithRejection<Query<ListParams>, Error>,
) -> Result<Json<Vec<Entry>>, Error> {
    service
        .execute(query::recently_viewed::List {
            user_id: session.user_id,
            limit: params.limit,
        })
        .await
        .map(|entries| Json(entries.into_iter().map(Into::into).collect()))
        .map_err(AsError::into_error)
}

impl AsError for command::record_property_view::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => {
                Some(api::property::PropertyError::NotExists.into())
            }
        }
    }
}

impl AsError for query::recently_viewed::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ZeroLimit => Some(Error::bad_request("INVALID_LIMIT", self)),
        }
    }
}
