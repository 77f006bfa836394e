//! [`Money`] definitions.

use std::{fmt, iter, ops, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal};

/// Amount of Indonesian Rupiah.
///
/// Always a non-negative whole number of rupiah, as IDR prices carry no minor
/// units.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Money(Decimal);

impl Money {
    /// ISO 4217 code of the currency.
    pub const CURRENCY: &'static str = "IDR";

    /// Zero rupiah.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Money`] if the provided `amount` is a non-negative
    /// integer.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (amount.is_integer() && !amount.is_sign_negative())
            .then(|| Self(amount.normalize()))
    }

    /// Creates a new [`Money`] out of the provided whole rupiah.
    #[must_use]
    pub fn from_rupiah(rupiah: u64) -> Self {
        Self(Decimal::from(rupiah))
    }

    /// Creates a new [`Money`] by flooring the provided `amount`.
    ///
    /// Negative amounts are clamped to [`Money::ZERO`].
    #[must_use]
    pub fn floor(amount: Decimal) -> Self {
        Self::new(amount.floor().max(Decimal::ZERO)).unwrap_or(Self::ZERO)
    }

    /// Returns the amount of this [`Money`].
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Indicates whether this [`Money`] is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtracts `rhs`, flooring the result at [`Money::ZERO`].
    #[must_use]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        if rhs >= self {
            Self::ZERO
        } else {
            Self(self.0 - rhs.0)
        }
    }

    /// Subtracts `rhs`, returning [`None`] if the result would be negative.
    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        (rhs <= self).then(|| Self(self.0 - rhs.0))
    }

    /// Returns a [`Display`] formatting this [`Money`] the way Indonesian
    /// receipts do, e.g. `Rp 1.250.000`.
    ///
    /// [`Display`]: fmt::Display
    #[must_use]
    pub fn rupiah(&self) -> impl fmt::Display + '_ {
        Rupiah(self)
    }
}

/// [`Money`] formatted with a `Rp` prefix and `.` thousand separators.
struct Rupiah<'a>(&'a Money);

impl fmt::Display for Rupiah<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.amount().trunc().normalize().to_string();
        let len = digits.len();

        f.write_str("Rp ")?;
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                f.write_str(".")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl ops::Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, ops::Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.to_u128() {
            Some(n) => write!(f, "{n}{}", Self::CURRENCY),
            None => write!(f, "{}{}", self.0, Self::CURRENCY),
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = s.strip_suffix(Self::CURRENCY).unwrap_or(s);
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;
        Self::new(amount).ok_or("amount must be a non-negative integer")
    }
}

#[cfg(feature = "postgres")]
mod postgres {
    //! [`postgres_types`] integration.

    use std::error::Error as StdError;

    use postgres_types::{
        accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql,
        Type,
    };
    use rust_decimal::Decimal;

    use super::Money;

    impl FromSql<'_> for Money {
        accepts!(NUMERIC);

        fn from_sql(
            ty: &Type,
            raw: &[u8],
        ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
            let amount = Decimal::from_sql(ty, raw)?;
            Self::new(amount).ok_or_else(|| {
                format!("invalid `Money` amount: {amount}").into()
            })
        }
    }

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
}

#[cfg(feature = "juniper")]
mod juniper {
    //! [`juniper`] integration.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Whole amount of Indonesian Rupiah in `{amount}IDR` format, e.g.
    /// `135000IDR`. The `IDR` suffix is optional on input.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Money = super::Money;

    impl Money {
        fn to_output<S: ScalarValue>(m: &Money) -> Value<S> {
            Value::scalar(m.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            let s = input.as_string_value().ok_or_else(|| {
                format!("Expected `Money` string, found: {input}")
            })?;
            Self::from_str(s).map_err(|e| format!("Cannot parse `Money`: {e}"))
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Money;

    #[test]
    fn from_str() {
        assert_eq!(
            Money::from_str("135000IDR").unwrap(),
            Money::from_rupiah(135_000),
        );
        assert_eq!(Money::from_str("25000").unwrap(), Money::from_rupiah(25_000));
        assert_eq!(Money::from_str("100.00IDR").unwrap(), Money::from_rupiah(100));

        assert!(Money::from_str("IDR").is_err());
        assert!(Money::from_str("12.5IDR").is_err());
        assert!(Money::from_str("-1IDR").is_err());
        assert!(Money::from_str("100USD").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(Money::from_rupiah(135_000).to_string(), "135000IDR");
        assert_eq!(Money::ZERO.to_string(), "0IDR");
        assert_eq!(
            Money::new(Decimal::new(2_500_000, 2)).unwrap().to_string(),
            "25000IDR",
        );
    }

    #[test]
    fn rupiah_format() {
        assert_eq!(Money::ZERO.rupiah().to_string(), "Rp 0");
        assert_eq!(Money::from_rupiah(999).rupiah().to_string(), "Rp 999");
        assert_eq!(Money::from_rupiah(1000).rupiah().to_string(), "Rp 1.000");
        assert_eq!(
            Money::from_rupiah(105_000).rupiah().to_string(),
            "Rp 105.000",
        );
        assert_eq!(
            Money::from_rupiah(1_250_000).rupiah().to_string(),
            "Rp 1.250.000",
        );
    }

    #[test]
    fn arithmetic() {
        let price = Money::from_rupiah(45_000);

        assert_eq!(price * 3, Money::from_rupiah(135_000));
        assert_eq!(
            Money::from_rupiah(30_000).saturating_sub(price),
            Money::ZERO,
        );
        assert_eq!(
            price.saturating_sub(Money::from_rupiah(5_000)),
            Money::from_rupiah(40_000),
        );
        assert_eq!(Money::from_rupiah(1).checked_sub(price), None);
        assert_eq!(
            Money::floor(Decimal::new(100_999, 1)),
            Money::from_rupiah(10_099),
        );
        assert_eq!(Money::floor(Decimal::from(-5)), Money::ZERO);
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn from_sql_rejects_fractional_amount() {
        use postgres_types::{private::BytesMut, FromSql as _, ToSql as _, Type};

        let encode = |amount: &str| {
            let mut raw = BytesMut::new();
            _ = Decimal::from_str(amount)
                .unwrap()
                .to_sql(&Type::NUMERIC, &mut raw)
                .unwrap();
            raw
        };

        assert_eq!(
            Money::from_sql(&Type::NUMERIC, &encode("25000")).unwrap(),
            Money::from_rupiah(25_000),
        );
        assert!(Money::from_sql(&Type::NUMERIC, &encode("25000.5")).is_err());
        assert!(Money::from_sql(&Type::NUMERIC, &encode("-1")).is_err());
    }
}
