//! Favorite-related endpoints.

use axum::{extract::Path, Extension, Json};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use service::{
    command::{self, Command as _},
    domain::{favorite, property},
    query, Query as _,
};

use crate::{api, AsError, Error, Service, Session};

/// Favorite status of a [`Property`] after toggling it.
///
/// [`Property`]: api::property::Property
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Toggled {
    /// Indicator whether the [`Property`] is a favorite now.
    ///
    /// [`Property`]: api::property::Property
    pub is_favorite: bool,
}

/// Lists favorite properties of the current user, most recently added first.
#[tracing::instrument(skip_all, fields(user.id = %session.user_id))]
pub async fn list(
    Extension(service): Extension<Service>,
    session: Session,
) -> Result<Json<Vec<api::property::Property>>, Error> {
    service
        .execute(query::favorites::List::by(session.user_id))
        .await
        .map(|list| Json(list.into_iter().map(Into::into).collect()))
        .map_err(AsError::into_error)
}

/// Adds the property to favorites of the current user, or removes it if it's
/// there already.
///
/// # Errors
///
/// Possible error codes:
/// - `PROPERTY_NOT_EXISTS` - if the property doesn't exist.
#[tracing::instrument(skip_all, fields(user.id = %session.user_id))]
pub async fn toggle(
    Extension(service): Extension<Service>,
    session: Session,
    WithRejection(Path(property_id), _): WithRejection<
        Path<property::Id>,
        Error,
    >,
) -> Result<Json<Toggled>, Error> {
    service
        .execute(command::ToggleFavorite {
            user_id: session.user_id,
            property_id,
        })
        .await
        .map(|is| {
            Json(Toggled {
                is_favorite: is.0,
            })
        })
        .map_err(AsError::into_error)
}

/// Checks whether the property is a favorite of the current user.
#[tracing::instrument(skip_all, fields(user.id = %session.user_id))]
pub async fn check(
    Extension(service): Extension<Service>,
    session: Session,
    WithRejection(Path(property_id), _): WithRejection<
        Path<property::Id>,
        Error,
    >,
) -> Result<Json<bool>, Error> {
    service
        .execute(query::favorite::Check::by(favorite::Key {
            user_id: session.user_id,
            property_id,
        }))
        .await
        .map(|is| Json(is.0))
        .map_err(AsError::into_error)
}

impl AsError for command::toggle_favorite::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => {
                Some(api::property::PropertyError::NotExists.into())
            }
        }
    }
}
