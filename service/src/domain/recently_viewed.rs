//! [`RecentlyViewed`] definitions.

use std::num::NonZeroU16;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From};

#[cfg(doc)]
use crate::domain::{Property, User};
use crate::domain::{property, user};

/// Record of a [`User`] viewing a [`Property`].
///
/// There is at most one record per [`User`] and [`Property`] pair, holding the
/// time of the latest view.
#[derive(Clone, Copy, Debug)]
pub struct RecentlyViewed {
    /// ID of the [`User`] who viewed the [`Property`].
    pub user_id: user::Id,

    /// ID of the viewed [`Property`].
    pub property_id: property::Id,

    /// [`DateTime`] of the latest view.
    pub viewed_at: ViewDateTime,
}

/// Maximum number of [`RecentlyViewed`] records retained per [`User`].
#[derive(
    Clone, Copy, Debug, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd,
)]
pub struct Capacity(NonZeroU16);

impl Capacity {
    /// Default [`Capacity`].
    pub const DEFAULT: Self = match Self::new(20) {
        Some(c) => c,
        None => unreachable!(),
    };

    /// Creates a new [`Capacity`] if the given `capacity` is non-zero.
    #[must_use]
    pub const fn new(capacity: u16) -> Option<Self> {
        match NonZeroU16::new(capacity) {
            Some(c) => Some(Self(c)),
            None => None,
        }
    }

    /// Returns this [`Capacity`] as a [`u16`].
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0.get()
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Selector of [`RecentlyViewed`] records of a [`User`] exceeding its
/// [`Capacity`], ordered from the most recent.
#[derive(Clone, Copy, Debug)]
pub struct Overflow {
    /// ID of the [`User`] whose records are selected.
    pub user_id: user::Id,

    /// Number of the most recent records to keep.
    pub capacity: Capacity,
}

/// [`DateTime`] when a [`Property`] was viewed.
pub type ViewDateTime = DateTimeOf<(RecentlyViewed, unit::View)>;
