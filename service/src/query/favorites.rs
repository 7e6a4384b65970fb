//! [`Query`] collection related to the multiple [`Favorite`]s.

use common::operations::By;

#[cfg(doc)]
use crate::{domain::Favorite, Query};
use crate::{domain::user, read};

use super::DatabaseQuery;

/// Queries [`Favorite`] properties of a user, most recently added first.
pub type List = DatabaseQuery<By<read::favorite::List, user::Id>>;
