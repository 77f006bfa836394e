//! Macros for defining kind enums.

/// Defines a `#[repr(u8)]` kind enum with a human-readable label per variant.
///
/// The generated enum:
/// - is (de)serialized and parsed in `SCREAMING_SNAKE_CASE`;
/// - is stored in Postgres as `INT2`;
/// - exposes its variants in declaration order via `ALL`.
///
/// # Example
///
/// ```rust
/// # use common::define_kind;
/// define_kind! {
///     #[doc = "Kind of a seat."]
///     enum Seat {
///         #[doc = "Seat next to a window."]
///         #[label = "Window"]
///         Window = 1,
///
///         #[doc = "Seat next to an aisle."]
///         #[label = "Aisle"]
///         Aisle = 2,
///     }
/// }
///
/// assert_eq!(Seat::Window.label(), "Window");
/// assert_eq!(Seat::Aisle.to_string(), "AISLE");
/// ```
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                #[label = $label:literal]
                $variant:ident = $value:literal
            ),+ $(,)?
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
        #[cfg_attr(
            feature = "serde",
            derive(
                $crate::private::serde::Deserialize,
                $crate::private::serde::Serialize,
            ),
            serde(rename_all = "SCREAMING_SNAKE_CASE"),
        )]
        #[doc = $doc]
        #[repr(u8)]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $(
                #[doc = $variant_doc]
                $variant = $value,
            )+
        }

        impl $name {
            /// All the variants in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the [`u8`] representation of this kind.
            #[must_use]
            pub const fn u8(self) -> u8 {
                self as u8
            }

            /// Returns the human-readable label of this kind.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl ::core::convert::TryFrom<u8> for $name {
            type Error = u8;

            fn try_from(v: u8) -> ::core::result::Result<Self, u8> {
                match v {
                    $($value => Ok(Self::$variant),)+
                    v => Err(v),
                }
            }
        }

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            $crate::private::postgres_types::accepts!(INT2);

            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &[u8],
            ) -> ::core::result::Result<
                Self,
                ::std::boxed::Box<
                    dyn ::std::error::Error
                        + ::core::marker::Sync
                        + ::core::marker::Send
                >,
            > {
                let raw = u8::try_from(
                    <i16 as $crate::private::postgres_types::FromSql>::from_sql(
                        ty, raw,
                    )?,
                )?;
                Self::try_from(raw).map_err(|v| {
                    ::std::format!(
                        "unknown `{}` value: {v}",
                        ::core::stringify!($name),
                    )
                    .into()
                })
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
            ) -> ::core::result::Result<
                $crate::private::postgres_types::IsNull,
                ::std::boxed::Box<
                    dyn ::std::error::Error
                        + ::core::marker::Sync
                        + ::core::marker::Send
                >,
            > {
                <i16 as $crate::private::postgres_types::ToSql>::to_sql(
                    &i16::from(self.u8()),
                    ty,
                    w,
                )
            }
        }
    };
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    crate::define_kind! {
        #[doc = "Fruit."]
        enum Fruit {
            #[doc = "Mango."]
            #[label = "Ripe mango"]
            Mango = 1,

            #[doc = "Star fruit."]
            #[label = "Star fruit"]
            StarFruit = 4,
        }
    }

    #[test]
    fn string_forms() {
        assert_eq!(Fruit::StarFruit.to_string(), "STAR_FRUIT");
        assert_eq!(Fruit::from_str("MANGO").unwrap(), Fruit::Mango);
        assert_eq!(Fruit::StarFruit.label(), "Star fruit");
    }

    #[test]
    fn numeric_forms() {
        assert_eq!(Fruit::StarFruit.u8(), 4);
        assert_eq!(Fruit::try_from(1), Ok(Fruit::Mango));
        assert_eq!(Fruit::try_from(2), Err(2));
        assert_eq!(Fruit::ALL, &[Fruit::Mango, Fruit::StarFruit]);
    }
}
