//! [`Money`]-related definitions.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{fmt, str::FromStr};

#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use rust_decimal::{prelude::ToPrimitive as _, Decimal};

/// Non-negative amount of money.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Money(Decimal);

impl Money {
    /// Zero [`Money`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Money`] if the provided `amount` is non-negative.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (!amount.is_sign_negative() || amount.is_zero())
            .then(|| Self(amount.normalize()))
    }

    /// Returns the amount of this [`Money`].
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }
}

impl From<u32> for Money {
    fn from(amount: u32) -> Self {
        Self(Decimal::from(amount))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_integer() {
            write!(f, "{}", self.0.to_u128().expect("non-negative integer"))
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| "invalid amount")?;
        Self::new(amount).ok_or("negative amount")
    }
}

#[cfg(feature = "postgres")]
impl FromSql<'_> for Money {
    accepts!(NUMERIC);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        Self::new(Decimal::from_sql(ty, raw)?)
            .ok_or_else(|| "negative `Money` amount".into())
    }
}

#[cfg(feature = "postgres")]
impl ToSql for Money {
    accepts!(NUMERIC);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, w)
    }
}

#[cfg(feature = "serde")]
mod serde {
    //! Module providing integration with [`serde`] crate.
    //!
    //! [`Money`] is serialized as a JSON number and deserialized from either a
    //! number or a decimal string (as query strings provide it).

    use std::fmt;

    use rust_decimal::{prelude::ToPrimitive as _, Decimal};
    use serde::{
        de::{self, Visitor},
        Deserialize, Deserializer, Serialize, Serializer,
    };

    use super::Money;

    impl Serialize for Money {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match self.0.to_u64() {
                Some(n) if self.0.is_integer() => serializer.serialize_u64(n),
                Some(_) | None => serializer.serialize_f64(
                    self.0.to_f64().ok_or_else(|| {
                        serde::ser::Error::custom("`Money` overflow")
                    })?,
                ),
            }
        }
    }

    impl<'de> Deserialize<'de> for Money {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(MoneyVisitor)
        }
    }

    /// [`Visitor`] of [`Money`].
    struct MoneyVisitor;

    impl MoneyVisitor {
        /// Checks the provided `amount` to be a valid [`Money`].
        fn check<E: de::Error>(amount: Decimal) -> Result<Money, E> {
            Money::new(amount)
                .ok_or_else(|| E::custom("amount must be non-negative"))
        }
    }

    impl Visitor<'_> for MoneyVisitor {
        type Value = Money;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative decimal amount")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
            Self::check(Decimal::from(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
            Self::check(Decimal::from(v))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
            Self::check(Decimal::try_from(v).map_err(E::custom)?)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
            v.parse().map_err(E::custom)
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Money;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn rejects_negative_amounts() {
        assert!(Money::new(decimal("-0.01")).is_none());
        assert!(Money::new(decimal("-100")).is_none());
        assert_eq!(Money::new(Decimal::ZERO), Some(Money::ZERO));
        assert!(Money::new(decimal("0.01")).is_some());
    }

    #[test]
    fn from_str() {
        assert_eq!(
            Money::from_str("123.45").unwrap().amount(),
            decimal("123.45"),
        );
        assert_eq!(Money::from_str(" 300000 ").unwrap(), Money::from(300_000));

        assert!(Money::from_str("-1").is_err());
        assert!(Money::from_str("123.45USD").is_err());
        assert!(Money::from_str("").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(Money::from_str("123.45").unwrap().to_string(), "123.45");
        assert_eq!(Money::from_str("123.00").unwrap().to_string(), "123");
        assert_eq!(Money::from_str("123.50").unwrap().to_string(), "123.5");
        assert_eq!(Money::from(650).to_string(), "650");
    }

    #[test]
    fn orders_by_amount() {
        assert!(Money::from(300_000) < Money::from(600_000));
        assert!(Money::from_str("99.99").unwrap() < Money::from(100));
        assert_eq!(
            Money::from_str("100.0").unwrap(),
            Money::from_str("100").unwrap(),
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_as_number() {
        assert_eq!(
            serde_json::to_string(&Money::from(450_000)).unwrap(),
            "450000",
        );
        assert_eq!(
            serde_json::to_string(&Money::from_str("12.5").unwrap()).unwrap(),
            "12.5",
        );

        assert_eq!(
            serde_json::from_str::<Money>("450000").unwrap(),
            Money::from(450_000),
        );
        assert_eq!(
            serde_json::from_str::<Money>(r#""12.5""#).unwrap(),
            Money::from_str("12.5").unwrap(),
        );
        assert!(serde_json::from_str::<Money>("-1").is_err());
    }
}
