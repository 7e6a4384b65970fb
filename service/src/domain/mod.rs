//! Domain definitions.

pub mod favorite;
pub mod property;
pub mod recently_viewed;
pub mod user;

pub use self::{
    favorite::Favorite, property::Property, recently_viewed::RecentlyViewed,
    user::User,
};
