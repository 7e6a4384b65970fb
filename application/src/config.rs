//! [`Config`]-related definitions.

use std::{num::NonZeroU16, time};

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Seeding configuration.
    pub seed: Seed,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    ///
    /// A single `*` allows any origin.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// [JWT] secret.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default("secret".to_owned())]
    pub jwt_secret: String,

    /// Issuer put into and expected from [JWT]s.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default("property-portal".to_owned())]
    pub jwt_issuer: String,

    /// Audience put into and expected from [JWT]s.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default("property-portal-users".to_owned())]
    pub jwt_audience: String,

    /// Time a session stays valid after login.
    #[default(time::Duration::from_secs(7 * 24 * 60 * 60))]
    #[serde(with = "humantime_serde")]
    pub session_ttl: time::Duration,

    /// Number of recently viewed properties retained per user.
    #[default(NonZeroU16::new(20).unwrap_or(NonZeroU16::MIN))]
    pub recently_viewed_capacity: NonZeroU16,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service {
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            session_ttl,
            recently_viewed_capacity,
        } = value;
        Self {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            jwt_issuer,
            jwt_audience,
            session_ttl,
            recently_viewed_capacity: recently_viewed_capacity.into(),
        }
    }
}

/// Seeding configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Seed {
    /// Number of properties to generate on start-up if there are none.
    ///
    /// `0` disables seeding.
    #[default(120)]
    pub properties: u16,
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use super::{Config, LogLevel};

    #[test]
    fn defaults_without_file() {
        let conf = Config::new("config.missing").unwrap();

        assert_eq!(conf.server.host, "0.0.0.0");
        assert_eq!(conf.server.port, 8080);
        assert_eq!(conf.server.cors.origins, ["*"]);
        assert_eq!(conf.seed.properties, 120);
        assert!(matches!(conf.log.level, LogLevel::Info));
        assert_eq!(conf.service.recently_viewed_capacity.get(), 20);
        assert_eq!(
            conf.service.session_ttl,
            Duration::from_secs(7 * 24 * 60 * 60),
        );
    }

    #[test]
    fn converts_into_service_config() {
        let conf = service::Config::from(Config::default().service);

        assert_eq!(conf.jwt_issuer, "property-portal");
        assert_eq!(conf.jwt_audience, "property-portal-users");
        assert_eq!(conf.recently_viewed_capacity.get(), 20);
    }
}
