//! [`Property`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Property listed for sale or rent.
#[derive(Clone, Debug)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: Id,

    /// [`Title`] of this [`Property`].
    pub title: Title,

    /// [`Description`] of this [`Property`], if any.
    pub description: Option<Description>,

    /// [`Address`] of this [`Property`].
    pub address: Address,

    /// [`City`] this [`Property`] is located in.
    pub city: City,

    /// [`Suburb`] this [`Property`] is located in, if known.
    pub suburb: Option<Suburb>,

    /// [`Type`] of this [`Property`], if known.
    ///
    /// [`Type`]: struct@Type
    pub property_type: Option<Type>,

    /// Price of this [`Property`].
    ///
    /// Total price for [`ListingType::Sale`] and weekly rent for
    /// [`ListingType::Rent`].
    pub price: Money,

    /// [`ListingType`] of this [`Property`].
    pub listing_type: ListingType,

    /// Number of bedrooms.
    pub bedrooms: u16,

    /// Number of bathrooms.
    pub bathrooms: u16,

    /// Number of car spots.
    pub car_spots: u16,

    /// Floor area in square meters, if known.
    pub floor_area: Option<u32>,

    /// Year this [`Property`] was built, if known.
    pub year_built: Option<u16>,

    /// [`ImageUrl`]s of this [`Property`] in display order.
    pub image_urls: Vec<ImageUrl>,

    /// Indicator whether this [`Property`] is promoted.
    pub is_featured: bool,

    /// [`DateTime`] when this [`Property`] was listed.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Property`] was last modified, if it was.
    pub updated_at: Option<ModificationDateTime>,
}

/// Upper bound (exclusive) of a [`Property`] price.
const PRICE_LIMIT: u64 = 10_000_000_000_000_000;

/// Checks whether the given [`Money`] is a valid [`Property`] price: whole
/// cents below 10^16.
#[must_use]
pub fn is_valid_price(price: Money) -> bool {
    let amount = price.amount();
    amount.scale() <= 2 && amount < Decimal::from(PRICE_LIMIT)
}

/// ID of a [`Property`].
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

define_kind! {
    #[doc = "Category a [`Property`] is listed in."]
    enum ListingType {
        #[doc = "[`Property`] is listed for sale."]
        Sale = 1,

        #[doc = "[`Property`] is listed for rent."]
        Rent = 2,
    }
}

/// Defines a trimmed non-empty text newtype of a [`Property`] with a maximum
/// length in characters.
macro_rules! define_text {
    ($(#[doc = $doc:literal])+ $name:ident, $max:literal) => {
        $(#[doc = $doc])+
        #[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
        #[cfg_attr(
            feature = "postgres",
            derive(FromSql, ToSql),
            postgres(transparent)
        )]
        #[as_ref(forward)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Maximum length of a [`", stringify!($name), "`].")]
            pub const MAX_LEN: usize = $max;

            #[doc = concat!("Creates a new [`", stringify!($name), "`].")]
            ///
            /// # Safety
            ///
            /// The caller must ensure that the given `text` matches the format.
            #[expect(unsafe_code, reason = "bypass")]
            #[must_use]
            pub unsafe fn new_unchecked(text: impl Into<String>) -> Self {
                Self(text.into())
            }

            #[doc = concat!(
                "Creates a new [`", stringify!($name),
                "`] if the given `text` is valid.",
            )]
            #[must_use]
            pub fn new(text: impl Into<String>) -> Option<Self> {
                let text = text.into();
                Self::check(&text).then_some(Self(text))
            }

            /// Checks whether the given `text` is valid.
            fn check(text: &str) -> bool {
                text.trim() == text
                    && !text.is_empty()
                    && text.chars().count() <= Self::MAX_LEN
            }
        }

        impl FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
                    .ok_or(concat!("invalid `", stringify!($name), "`"))
            }
        }
    };
}

define_text! {
    /// Title of a [`Property`].
    Title, 200
}

define_text! {
    /// Street address of a [`Property`].
    Address, 500
}

define_text! {
    /// City of a [`Property`].
    City, 100
}

define_text! {
    /// Suburb of a [`Property`].
    Suburb, 100
}

define_text! {
    /// Type of a [`Property`] (`House`, `Apartment`, etc).
    Type, 50
}

define_text! {
    /// Free-form description of a [`Property`].
    Description, 4000
}

/// URL of a [`Property`] image.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Creates a new [`ImageUrl`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `url` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Creates a new [`ImageUrl`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        Self::check(&url).then_some(Self(url))
    }

    /// Checks whether the given `url` is a valid [`ImageUrl`].
    fn check(url: impl AsRef<str>) -> bool {
        /// Regular expression checking an absolute HTTP(S) URL without
        /// whitespace.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^(?i)https?://[^\s/?#]+[^\s]*$").expect("valid regex")
        });

        let url = url.as_ref();
        url.len() <= 2048 && REGEX.is_match(url)
    }
}

impl FromStr for ImageUrl {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ImageUrl`")
    }
}

/// [`DateTime`] when a [`Property`] was listed.
pub type CreationDateTime = DateTimeOf<(Property, unit::Creation)>;

/// [`DateTime`] when a [`Property`] was modified.
pub type ModificationDateTime = DateTimeOf<(Property, unit::Modification)>;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::Money;

    use super::{is_valid_price, City, ImageUrl, ListingType, Title};

    #[test]
    fn price_is_whole_cents_below_limit() {
        let price = |s: &str| Money::from_str(s).unwrap();

        assert!(is_valid_price(Money::ZERO));
        assert!(is_valid_price(price("850000.50")));
        assert!(is_valid_price(price("9999999999999999.99")));
        assert!(is_valid_price(price("12.300")));

        assert!(!is_valid_price(price("0.001")));
        assert!(!is_valid_price(price("10000000000000000")));
    }

    #[test]
    fn text_bounds() {
        assert!(Title::new("Sunny flat").is_some());
        assert!(Title::new("").is_none());
        assert!(Title::new(" Sunny flat").is_none());
        assert!(Title::new("x".repeat(200)).is_some());
        assert!(Title::new("x".repeat(201)).is_none());

        assert!(City::new("Gold Coast").is_some());
        assert!(City::new("й".repeat(100)).is_some());
        assert!(City::new("й".repeat(101)).is_none());
    }

    #[test]
    fn image_url_format() {
        assert!(ImageUrl::new("https://images.example.com/a.jpg").is_some());
        assert!(ImageUrl::new("HTTP://example.com").is_some());
        assert!(ImageUrl::new("ftp://example.com/a.jpg").is_none());
        assert!(ImageUrl::new("https://").is_none());
        assert!(ImageUrl::new("https://exa mple.com").is_none());
    }

    #[test]
    fn listing_type_is_case_insensitive() {
        assert_eq!("sale".parse::<ListingType>(), Ok(ListingType::Sale));
        assert_eq!("RENT".parse::<ListingType>(), Ok(ListingType::Rent));
        assert!("lease".parse::<ListingType>().is_err());
        assert_eq!(ListingType::Rent.to_string(), "Rent");
    }
}
