//! [`Query`] collection related to [`Discount`]s.

use common::operations::By;

use crate::domain::{user, Discount};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries the [`Discount`] granted to a [`User`].
pub type ByUserId = DatabaseQuery<By<Option<Discount>, user::Id>>;
