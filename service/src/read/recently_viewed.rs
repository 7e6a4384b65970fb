//! [`RecentlyViewed`] read model definitions.

use crate::domain::{property, recently_viewed, user, Property};
#[cfg(doc)]
use crate::domain::{RecentlyViewed, User};

/// [`RecentlyViewed`] record joined with the current [`Property`] data.
#[derive(Clone, Debug)]
pub struct Entry {
    /// ID of the viewed [`Property`].
    pub property_id: property::Id,

    /// [`recently_viewed::ViewDateTime`] of the latest view.
    pub viewed_at: recently_viewed::ViewDateTime,

    /// Viewed [`Property`].
    pub property: Property,
}

/// Selector of the latest [`Entry`]s of a [`User`].
#[derive(Clone, Copy, Debug)]
pub struct Selector {
    /// ID of the [`User`] whose [`Entry`]s are selected.
    pub user_id: user::Id,

    /// Maximum number of [`Entry`]s to select.
    pub limit: u16,
}
