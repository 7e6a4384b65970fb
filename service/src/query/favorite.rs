//! [`Query`] collection related to a single [`Favorite`].

use common::operations::By;

#[cfg(doc)]
use crate::{domain::Favorite, Query};
use crate::{domain::favorite, read};

use super::DatabaseQuery;

/// Checks whether a [`Favorite`] with the provided [`favorite::Key`] exists.
pub type Check = DatabaseQuery<By<read::favorite::IsFavorite, favorite::Key>>;
