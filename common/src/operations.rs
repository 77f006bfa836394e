//! Operations a [`Handler`] may be executed with.
//!
//! Each operation is a thin wrapper naming *what* should happen to the
//! wrapped value, so a single storage type may implement [`Handler`] once per
//! operation and entity.

use std::marker::PhantomData;

use crate::Handler;

/// Persists a new value.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Overwrites an existing value.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Reads a value.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Acquires an exclusive lock on a value until the surrounding transaction
/// ends.
#[derive(Clone, Copy, Debug)]
pub struct Lock<T>(pub T);

/// Begins a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// Handler returned by executing [`Transact`] on `T`.
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Commits a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Selector of a `W`hat by a `B`y value.
///
/// `W` only exists on the type level, so the same `B` may select different
/// things, e.g. `By<Option<User>, Id>` and `By<Vec<Document>, Id>`.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// What is selected.
    _what: PhantomData<W>,

    /// Value to select by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector.
    #[must_use]
    pub const fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Returns the value to select by.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
