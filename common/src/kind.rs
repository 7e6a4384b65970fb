//! Macros for defining kind enums.

/// Macro for defining a kind enum.
///
/// Defined enum is displayed with its variant name and parsed from it
/// case-insensitively, which is also its [`serde`] representation with the
/// `serde` feature enabled. It's stored as `INT2` in Postgres.
///
/// # Example
///
/// ```rust,ignore
/// # use common::define_kind;
/// define_kind! {
///     #[doc = "Shape kind."]
///     enum Kind {
///         #[doc = "A cube"]
///         Cube = 1,
///
///         #[doc = "A sphere"]
///         Sphere = 2,
///     }
/// }
///
/// assert_eq!("cUbE".parse::<Kind>().unwrap(), Kind::Cube);
/// assert_eq!(Kind::Sphere.to_string(), "Sphere");
/// ```
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::EnumString,
            Eq,
            Hash,
            PartialEq,
        )]
        #[doc = $doc]
        #[repr(u8)]
        #[strum(ascii_case_insensitive)]
        pub enum $name {
            $(
                 #[doc = $variant_doc]
                 $variant = $value,
            )*
        }

        impl $name {
            /// Converts this into its [`u8`] representation.
            #[must_use]
            pub const fn u8(self) -> u8 {
                self as u8
            }
        }

        $crate::__kind_serde!($name);

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            $crate::private::postgres_types::accepts!(INT2);

            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &[u8],
            ) -> Result<
                $name,
                Box<dyn ::std::error::Error
                    + ::core::marker::Sync
                    + ::core::marker::Send>,
            > {
                match u8::try_from(i16::from_sql(ty, raw)?)? {
                    $(
                        v if Self::$variant.u8() == v => Ok(Self::$variant),
                    )*
                    v => Err(::std::format!(
                        "invalid `{}` value: {v}",
                        ::core::stringify!($name),
                    ).into()),
                }
            }
        }

        #[cfg(feature = "postgres")]
        impl $crate::private::postgres_types::ToSql for $name {
            $crate::private::postgres_types::accepts!(INT2);
            $crate::private::postgres_types::to_sql_checked!();

            fn to_sql(
                &self,
                ty: &$crate::private::postgres_types::Type,
                w: &mut $crate::private::postgres_types::private::BytesMut,
            ) -> Result<
                $crate::private::postgres_types::IsNull,
                ::std::boxed::Box<
                    dyn ::std::error::Error
                        + ::core::marker::Sync
                        + ::core::marker::Send
                >,
            > {
                i16::from(self.u8()).to_sql(ty, w)
            }
        }
    };
}

/// Implements [`serde`] traits for a [`define_kind!`] enum via its
/// [`Display`] and [`FromStr`] implementations.
///
/// [`Display`]: std::fmt::Display
/// [`FromStr`]: std::str::FromStr
#[cfg(feature = "serde")]
#[doc(hidden)]
#[macro_export]
macro_rules! __kind_serde {
    ($name:ident) => {
        impl $crate::private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::private::serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> $crate::private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::private::serde::Deserializer<'de>,
            {
                let s = <::std::string::String as
                    $crate::private::serde::Deserialize>::deserialize(
                        deserializer,
                    )?;
                s.parse().map_err(|_| {
                    <D::Error as $crate::private::serde::de::Error>::custom(
                        ::std::format!(
                            "invalid `{}` value: {s}",
                            ::core::stringify!($name),
                        ),
                    )
                })
            }
        }
    };
}

/// No-op without the `serde` feature.
#[cfg(not(feature = "serde"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __kind_serde {
    ($name:ident) => {};
}
