//! [`Favorite`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};

#[cfg(doc)]
use crate::domain::{Property, User};
use crate::domain::{property, user};

/// [`Property`] bookmarked by a [`User`].
#[derive(Clone, Copy, Debug)]
pub struct Favorite {
    /// ID of the [`User`] who bookmarked the [`Property`].
    pub user_id: user::Id,

    /// ID of the bookmarked [`Property`].
    pub property_id: property::Id,

    /// [`DateTime`] when the [`Property`] was bookmarked.
    pub added_at: AdditionDateTime,
}

impl Favorite {
    /// Returns the [`Key`] identifying this [`Favorite`].
    #[must_use]
    pub const fn key(&self) -> Key {
        Key {
            user_id: self.user_id,
            property_id: self.property_id,
        }
    }
}

/// Identity of a [`Favorite`], unique per [`User`] and [`Property`] pair.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Key {
    /// ID of the [`User`].
    pub user_id: user::Id,

    /// ID of the [`Property`].
    pub property_id: property::Id,
}

/// [`DateTime`] when a [`Favorite`] was added.
pub type AdditionDateTime = DateTimeOf<(Favorite, unit::Addition)>;
