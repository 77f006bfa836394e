//! Helpers for defining GraphQL scalars.

use std::{fmt, marker::PhantomData, str::FromStr};

use juniper::{
    GraphQLType, InputValue, ParseScalarResult, ParseScalarValue, ScalarToken,
    ScalarValue, Value,
};

/// Adapter for `#[graphql(with = ..)]` attribute, representing a scalar as a
/// string in the textual form of its domain type `As`.
///
/// The scalar type must be [`TryFrom<As>`] on input and [`AsRef<As>`] on
/// output, so the domain validation runs once in [`FromStr`] of `As`, and
/// once more in the [`TryFrom`] conversion, if the scalar narrows `As` any
/// further.
#[derive(Debug)]
pub struct Via<As>(PhantomData<As>);

impl<As> Via<As> {
    /// Outputs the scalar as the [`Display`]ed `As` string.
    ///
    /// [`Display`]: fmt::Display
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: fmt::Display,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::scalar(value.as_ref().to_string())
    }

    /// Reads the scalar from a string input.
    ///
    /// # Errors
    ///
    /// If the input is not a string, or it doesn't pass the validation of
    /// `As`, or of the scalar type itself.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: FromStr,
        As::Err: fmt::Display,
        T: TryFrom<As> + GraphQLType<S, TypeInfo = ()>,
        T::Error: fmt::Display,
        S: ScalarValue,
    {
        let name = T::name(&()).expect("named scalar");
        let Some(s) = input.as_string_value() else {
            return Err(format!("Expected `{name}` string, found: {input}"));
        };
        let value = s
            .parse::<As>()
            .map_err(|e| format!("Cannot parse `{name}` from \"{s}\": {e}"))?;
        T::try_from(value).map_err(|e| format!("Invalid `{name}`: {e}"))
    }

    /// Parses a string [`ScalarToken`].
    ///
    /// # Errors
    ///
    /// If the token is not a string.
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(value)
    }
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, InputValue};
    use service::domain;

    use crate::api::{booking, user};

    use super::Via;

    type Email = Via<domain::user::Email>;

    #[test]
    fn reads_valid_input() {
        let input = InputValue::<DefaultScalarValue>::scalar("agent@travel.id");

        let email: user::Email = Email::from_input(&input).unwrap();

        assert_eq!(email.to_string(), "agent@travel.id");
    }

    #[test]
    fn rejects_invalid_input() {
        let input = InputValue::<DefaultScalarValue>::scalar("not an email");
        assert!(Email::from_input::<user::Email, _>(&input)
            .unwrap_err()
            .starts_with("Cannot parse `UserEmail`"));

        let input = InputValue::<DefaultScalarValue>::scalar(42);
        assert!(Email::from_input::<user::Email, _>(&input)
            .unwrap_err()
            .starts_with("Expected `UserEmail` string"));

        let input = InputValue::<DefaultScalarValue>::scalar(" Budi ");
        assert!(Via::<domain::booking::CustomerName>::from_input::<
            booking::CustomerName,
            _,
        >(&input)
        .is_err());
    }
}
