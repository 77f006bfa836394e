//! [`Document`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

/// KYC document a [`User`] submitted on registration.
///
/// The file itself lives in external object storage, only its public [`Url`]
/// is kept.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Document {
    /// ID of the [`User`] this [`Document`] belongs to.
    pub user_id: user::Id,

    /// [`Kind`] of this [`Document`].
    pub kind: Kind,

    /// Public [`Url`] of the uploaded file.
    pub url: Url,

    /// [`DateTime`] when this [`Document`] was uploaded.
    pub uploaded_at: UploadDateTime,
}

define_kind! {
    #[doc = "Kind of a [`Document`]."]
    enum Kind {
        #[doc = "National identity card (KTP)."]
        #[label = "Identity card"]
        IdentityCard = 1,

        #[doc = "Business license (NIB/SIUP)."]
        #[label = "Business license"]
        BusinessLicense = 2,

        #[doc = "Tax registration number (NPWP)."]
        #[label = "Tax ID"]
        TaxId = 3,
    }
}

/// Public URL of an uploaded [`Document`] file.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Url(String);

impl Url {
    /// Creates a new [`Url`] if the given `url` is an absolute `http(s)` one.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))?;
        (!rest.is_empty()
            && url.len() <= 2048
            && !url.chars().any(char::is_whitespace))
        .then_some(Self(url))
    }
}

impl std::str::FromStr for Url {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Url`")
    }
}

/// [`DateTime`] when a [`Document`] was uploaded.
pub type UploadDateTime = DateTimeOf<(Document, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Kind, Url};

    #[test]
    fn url_requires_http_scheme() {
        assert!(Url::new("https://storage.example.id/kyc/ktp.jpg").is_some());
        assert!(Url::new("http://cdn.local/a.pdf").is_some());

        assert!(Url::new("ftp://storage/ktp.jpg").is_none());
        assert!(Url::new("https://").is_none());
        assert!(Url::new("https://a b/c").is_none());
    }

    #[test]
    fn kind_parses_screaming_case() {
        assert_eq!("TAX_ID".parse::<Kind>().unwrap(), Kind::TaxId);
        assert_eq!(Kind::BusinessLicense.label(), "Business license");
    }
}
