//! [`Database`]-related implementations.

#[cfg(test)]
pub mod mock;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),

    #[cfg(test)]
    /// Failure injected into a [`mock::Mock`].
    #[display("`{_0:?}` failed on purpose")]
    Mock(#[error(not(source))] mock::Op),
}

impl Error {
    /// Checks whether this [`Error`] is a violation of the unique
    /// `constraint`.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: &str) -> bool {
        match *self {
            #[cfg(feature = "postgres")]
            Self::Postgres(ref e) => e.is_unique_violation(constraint),
            #[cfg(test)]
            Self::Mock(_) => false,
        }
    }
}
