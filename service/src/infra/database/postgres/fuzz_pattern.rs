//! [`FuzzPattern`] definition.

use derive_more::Display;
use itertools::Itertools as _;
use postgres_types::{FromSql, ToSql};

/// Characters having a special meaning in a `SIMILAR TO` pattern.
const SPECIAL: &[char] = &[
    '\\', '%', '_', '|', '*', '+', '?', '{', '}', '(', ')', '[', ']',
];

/// `SIMILAR TO` pattern matching a text containing any word of a search
/// input.
///
/// Used for searching [`User`]s and [`Booking`]s by names.
///
/// [`Booking`]: crate::domain::Booking
/// [`User`]: crate::domain::User
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct FuzzPattern(String);

impl FuzzPattern {
    /// Creates a new [`FuzzPattern`] out of the given search `input`.
    #[must_use]
    pub fn new(input: &str) -> Self {
        let alternatives = input
            .split_whitespace()
            .map(|word| format!("%{}%", escape(word)))
            .join("|");
        Self(format!("({alternatives})"))
    }
}

/// Escapes [`SPECIAL`] characters of the provided `word`.
fn escape(word: &str) -> String {
    word.chars().fold(String::with_capacity(word.len()), |mut out, c| {
        if SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
        out
    })
}

#[cfg(test)]
mod spec {
    use super::FuzzPattern;

    #[test]
    fn matches_any_word() {
        assert_eq!(
            FuzzPattern::new("  Budi   Santoso ").to_string(),
            "(%Budi%|%Santoso%)",
        );
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(
            FuzzPattern::new("50%_off (VIP)").to_string(),
            r"(%50\%\_off%|%\(VIP\)%)",
        );
    }
}
