//! [`Favorite`] read model definitions.

use derive_more::{Deref, From, Into, IntoIterator};

#[cfg(doc)]
use crate::domain::{Favorite, User};
use crate::domain::Property;

/// Indicator whether a [`Property`] is a [`Favorite`] of a [`User`].
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct IsFavorite(pub bool);

impl PartialEq<bool> for IsFavorite {
    fn eq(&self, other: &bool) -> bool {
        self.0 == *other
    }
}

/// [`Favorite`] [`Property`]s of a [`User`], most recently added first.
#[derive(Clone, Debug, Default, Deref, From, Into, IntoIterator)]
pub struct List(#[into_iterator(owned, ref)] Vec<Property>);
