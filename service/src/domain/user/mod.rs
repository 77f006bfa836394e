//! [`User`] definitions.

pub mod document;
pub mod session;

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::discount;

pub use self::{document::Document, session::Session};

/// Registered account: either an agent booking handling services on behalf
/// of travelers, or an operator administering them.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// [`Email`] of this [`User`], used to sign in.
    pub email: Email,

    /// [`PasswordHash`] of this [`User`].
    pub password_hash: PasswordHash,

    /// [`Phone`] of this [`User`].
    pub phone: Phone,

    /// [`CompanyName`] this [`User`] acts for, if any.
    pub company: Option<CompanyName>,

    /// [`Role`] of this [`User`].
    pub role: Role,

    /// Prepaid wallet balance ("saldo") of this [`User`].
    pub balance: Money,

    /// Last [`discount::Snapshot`] saved for this [`User`] by an operator.
    pub discount: Option<discount::Snapshot>,

    /// [`DateTime`] when this [`User`] registered.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`User`] was deleted.
    pub deleted_at: Option<DeletionDateTime>,
}

impl User {
    /// Indicates whether this [`User`] administers the system.
    #[must_use]
    pub fn is_operator(&self) -> bool {
        self.role == Role::Operator
    }
}

define_kind! {
    #[doc = "Role of a [`User`]."]
    enum Role {
        #[doc = "Agent booking handling services."]
        #[label = "Agent"]
        Agent = 1,

        #[doc = "Operator administering agents and bookings."]
        #[label = "Operator"]
        Operator = 2,
    }
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
    /// Creates a new time-ordered [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

/// Full name of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] without checking it.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` is a valid [`Name`].
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is trimmed, non-empty and
    /// at most 128 characters long.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        (name.trim() == name && !name.is_empty() && name.chars().count() <= 128)
            .then_some(Self(name))
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Name of the travel agency or company a [`User`] acts for.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct CompanyName(String);

impl CompanyName {
    /// Creates a new [`CompanyName`] if the given `name` is trimmed, non-empty
    /// and at most 256 characters long.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        (name.trim() == name && !name.is_empty() && name.chars().count() <= 256)
            .then_some(Self(name))
    }
}

impl FromStr for CompanyName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `CompanyName`")
    }
}

/// Password of a [`User`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct Password(String);

impl Password {
    /// Creates a new [`Password`] if the given `password` is 6 to 128
    /// characters long.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        (6..=128)
            .contains(&password.chars().count())
            .then_some(Self(password))
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

/// [bcrypt] hash of a [`Password`].
///
/// [bcrypt]: https://wikipedia.org/wiki/Bcrypt
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// [bcrypt] cost factor.
    ///
    /// [bcrypt]: https://wikipedia.org/wiki/Bcrypt
    #[cfg(not(test))]
    const COST: u32 = bcrypt::DEFAULT_COST;

    /// Minimal [bcrypt] cost factor.
    ///
    /// [bcrypt]: https://wikipedia.org/wiki/Bcrypt
    #[cfg(test)]
    const COST: u32 = 4;

    /// Hashes the provided [`Password`] with a random salt.
    ///
    /// # Errors
    ///
    /// If [`bcrypt`] fails to hash the [`Password`].
    pub fn new(password: &Password) -> Result<Self, bcrypt::BcryptError> {
        bcrypt::hash(&password.0, Self::COST).map(Self)
    }

    /// Checks whether the provided [`Password`] matches this [`PasswordHash`].
    ///
    /// Malformed hashes never match.
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        bcrypt::verify(&password.0, &self.0).unwrap_or(false)
    }
}

/// Email address of a [`User`].
///
/// Stored lowercased, so lookups are case-insensitive.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] without checking it.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` is a valid lowercase
    /// [`Email`].
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Email`] if the given `address` looks like one.
    #[must_use]
    pub fn new(address: impl AsRef<str>) -> Option<Self> {
        /// Pragmatic `local@domain.tld` shape.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex")
        });

        let address = address.as_ref().trim().to_lowercase();
        (address.len() <= 254 && REGEX.is_match(&address))
            .then_some(Self(address))
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Indonesian mobile phone number.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`] if the given `number` is a mobile number in
    /// either `08..` or `+628..` form. Spaces and dashes are allowed between
    /// digits.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        /// Digits with optional country code, separators stripped.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^(\+?62|0)8\d{7,11}$").expect("valid regex")
        });

        let number = number.into();
        let digits = number
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect::<String>();
        (number.trim() == number && REGEX.is_match(&digits))
            .then_some(Self(number))
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// [`DateTime`] when a [`User`] registered.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

/// [`DateTime`] when a [`User`] was deleted.
pub type DeletionDateTime = DateTimeOf<(User, unit::Deletion)>;

#[cfg(test)]
mod spec {
    use uuid::Uuid;

    use super::{Email, Id, Name, Password, PasswordHash, Phone};

    #[test]
    fn ids_are_time_based() {
        assert_eq!(Uuid::from(Id::new()).get_version_num(), 7);
    }

    #[test]
    fn email_is_normalized() {
        let email = Email::new("  Agent@Travel.CO.id ").unwrap();

        assert_eq!(email.to_string(), "agent@travel.co.id");
        assert!(Email::new("agent@travel").is_none());
        assert!(Email::new("agent travel@x.id").is_none());
    }

    #[test]
    fn phone_accepts_indonesian_mobiles() {
        assert!(Phone::new("081234567890").is_some());
        assert!(Phone::new("+62 812-3456-7890").is_some());
        assert!(Phone::new("6281234567").is_some());

        assert!(Phone::new("021555123").is_none());
        assert!(Phone::new("+1 555 123 4567").is_none());
        assert!(Phone::new(" 081234567890").is_none());
    }

    #[test]
    fn name_is_trimmed_and_bounded() {
        assert!(Name::new("Budi Santoso").is_some());
        assert!(Name::new(" Budi").is_none());
        assert!(Name::new("").is_none());
        assert!(Name::new("x".repeat(129)).is_none());
    }

    #[test]
    fn password_hash_verifies() {
        let password = Password::new("s3cret!").unwrap();
        let other = Password::new("s3cret?").unwrap();

        let hash = PasswordHash::new(&password).unwrap();

        assert!(hash.verify(&password));
        assert!(!hash.verify(&other));
        assert!(Password::new("short").is_none());
    }
}
