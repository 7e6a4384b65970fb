//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_property;
pub mod create_user;
pub mod create_user_session;
pub mod record_property_view;
pub mod seed_properties;
pub mod toggle_favorite;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    create_property::CreateProperty, create_user::CreateUser,
    create_user_session::CreateUserSession,
    record_property_view::RecordPropertyView,
    seed_properties::SeedProperties, toggle_favorite::ToggleFavorite,
};
