//! [`User`] definitions.

pub mod session;

use std::sync::LazyLock;

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHasher as _, PasswordVerifier as _,
        SaltString,
    },
    Argon2,
};
#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::session::Session;

/// Platform user.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`]
    pub id: Id,

    /// [`Email`] of this [`User`].
    pub email: Email,

    /// [`PasswordHash`] of this [`User`].
    pub password_hash: PasswordHash,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Password of a [`User`].
#[derive(Clone, derive_more::Debug, Eq, PartialEq)]
#[debug("Password(***)")]
pub struct Password(String);

impl Password {
    /// Minimum length of a [`Password`] in characters.
    pub const MIN_LEN: usize = 6;

    /// Maximum length of a [`Password`] in characters.
    pub const MAX_LEN: usize = 100;

    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let len = password.as_ref().chars().count();
        (Self::MIN_LEN..=Self::MAX_LEN).contains(&len)
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// [Argon2] hash of a [`User`]'s [`Password`] in the [PHC string format].
///
/// [Argon2]: https://en.wikipedia.org/wiki/Argon2
/// [PHC string format]: https://github.com/P-H-C/phc-string-format
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes the given [`Password`] with a random salt.
    ///
    /// # Errors
    ///
    /// If the hashing algorithm fails.
    pub fn new(
        password: &Password,
    ) -> Result<Self, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.0.as_bytes(), &salt)
            .map(|h| Self(h.to_string()))
    }

    /// Checks whether the given [`Password`] matches this [`PasswordHash`].
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        argon2::PasswordHash::new(&self.0).is_ok_and(|hash| {
            Argon2::default()
                .verify_password(password.0.as_bytes(), &hash)
                .is_ok()
        })
    }
}

/// Email address of a [`User`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an [`Email`].
    pub const MAX_LEN: usize = 256;

    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking the `local@domain.tld` shape.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= Self::MAX_LEN && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Email, Password, PasswordHash};

    #[test]
    fn email_format() {
        assert!(Email::new("jane@example.com").is_some());
        assert!(Email::new("jane.doe+ads@mail.example.com.au").is_some());
        assert!(Email::new("jane@localhost").is_none());
        assert!(Email::new("jane example@mail.com").is_none());
        assert!(Email::new("@example.com").is_none());
        assert!(Email::new("").is_none());
    }

    #[test]
    fn password_length() {
        assert!(Password::new("12345").is_none());
        assert!(Password::new("123456").is_some());
        assert!(Password::new("x".repeat(100)).is_some());
        assert!(Password::new("x".repeat(101)).is_none());
    }

    #[test]
    fn password_hash_verifies_only_original() {
        let password = Password::new("correct horse").unwrap();
        let hash = PasswordHash::new(&password).unwrap();

        assert_ne!(hash.to_string(), "correct horse");
        assert!(hash.verify(&password));
        assert!(!hash.verify(&Password::new("wrong horse").unwrap()));
    }

    #[test]
    fn password_is_not_printed() {
        let password = Password::new("correct horse").unwrap();

        assert_eq!(format!("{password:?}"), "Password(***)");
    }

    #[test]
    fn password_hash_is_salted() {
        let password = Password::new("correct horse").unwrap();

        assert_ne!(
            PasswordHash::new(&password).unwrap(),
            PasswordHash::new(&password).unwrap(),
        );
    }
}
