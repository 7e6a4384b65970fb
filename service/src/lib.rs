//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;

use std::time::Duration;

use derive_more::Debug;

use domain::recently_viewed;
#[cfg(doc)]
use domain::{user::Session, RecentlyViewed};
#[cfg(doc)]
use infra::Database;

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// Issuer of [`Session`] tokens.
    pub jwt_issuer: String,

    /// Audience of [`Session`] tokens.
    pub jwt_audience: String,

    /// Time a [`Session`] stays valid after its creation.
    pub session_ttl: Duration,

    /// Number of [`RecentlyViewed`] records retained per user.
    pub recently_viewed_capacity: recently_viewed::Capacity,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub const fn new(config: Config, database: Db) -> Self {
        Self { config, database }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub const fn database(&self) -> &Db {
        &self.database
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use crate::{domain::recently_viewed, infra::Memory, Config, Service};

    /// Secret the test [`Service`] signs tokens with.
    const SECRET: &[u8] = b"test-secret";

    /// Creates a new [`Service`] over an empty [`Memory`] database.
    pub(crate) fn service() -> Service<Memory> {
        service_with_capacity(recently_viewed::Capacity::DEFAULT)
    }

    /// Creates a new [`Service`] over an empty [`Memory`] database with the
    /// given [`recently_viewed::Capacity`].
    pub(crate) fn service_with_capacity(
        capacity: recently_viewed::Capacity,
    ) -> Service<Memory> {
        Service::new(
            Config {
                jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                    SECRET,
                ),
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                    SECRET,
                ),
                jwt_issuer: "portal".into(),
                jwt_audience: "portal-users".into(),
                session_ttl: Duration::from_secs(7 * 24 * 60 * 60),
                recently_viewed_capacity: capacity,
            },
            Memory::new(),
        )
    }
}
