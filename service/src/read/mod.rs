//! Read entities definitions.

pub mod favorite;
pub mod property;
pub mod recently_viewed;
