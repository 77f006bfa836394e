//! [`Query`] collection related to wallet ledger [`Entry`]s.
//!
//! [`Entry`]: crate::domain::ledger::Entry

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::read;

use super::DatabaseQuery;

/// Queries a list of ledger [`Entry`]s of a single [`User`].
///
/// [`Entry`]: crate::domain::ledger::Entry
/// [`User`]: crate::domain::User
pub type List =
    DatabaseQuery<By<read::ledger::list::Page, read::ledger::list::Selector>>;
