//! Wallet ledger definitions.

use common::{DateTime, Money};
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, Context};

/// Record of a wallet balance change.
#[derive(Clone, Debug, From, Into)]
pub struct Entry(domain::ledger::Entry);

/// Record of a wallet balance change.
#[graphql_object(name = "LedgerEntry", context = Context)]
impl Entry {
    /// Unique identifier of this `LedgerEntry`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `User` whose balance has changed.
    #[must_use]
    pub fn user(&self) -> api::User {
        #[expect(unsafe_code, reason = "`Entry` references existing `User`")]
        unsafe {
            api::User::new_unchecked(self.0.user_id)
        }
    }

    /// `LedgerEntryKind` of this `LedgerEntry`.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.0.kind.into()
    }

    /// Amount the balance changed by.
    #[must_use]
    pub fn amount(&self) -> Money {
        self.0.amount
    }

    /// Balance right after the change.
    #[must_use]
    pub fn balance_after(&self) -> Money {
        self.0.balance_after
    }

    /// Human-readable description of the change.
    #[must_use]
    pub fn description(&self) -> String {
        self.0.description.to_string()
    }

    /// `DateTime` when the change happened.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `LedgerEntry`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::ledger::Id)]
#[into(domain::ledger::Id)]
#[graphql(name = "LedgerEntryId", transparent)]
pub struct Id(Uuid);

define_enum! {
    #[doc = "Kind of a `LedgerEntry`."]
    #[graphql(name = "LedgerEntryKind")]
    enum Kind = domain::ledger::Kind {
        #[doc = "Balance credited."]
        TopUp,

        #[doc = "Balance debited for a `Booking`."]
        Payment,
    }
}

pub mod list {
    //! Definitions related to the ledger [`Entry`] list.

    use derive_more::{AsRef, From, Into};
    use juniper::{graphql_object, GraphQLScalar};
    use service::read;

    use crate::{api, Context};

    use super::Entry;

    /// Cursor for the `LedgerEntry` list.
    #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
    #[graphql(
        name = "LedgerListCursor",
        with = api::scalar::Via::<read::ledger::list::Cursor>,
    )]
    pub struct Cursor(pub read::ledger::list::Cursor);

    /// Edge in the [`Entry`] list.
    #[derive(Clone, Debug, From, Into)]
    pub struct Edge(read::ledger::list::Edge);

    /// Edge in the `LedgerEntry` list.
    #[graphql_object(name = "LedgerListEdge", context = Context)]
    impl Edge {
        /// Cursor of this `LedgerListEdge`.
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            self.0.cursor.into()
        }

        /// Node of this `LedgerListEdge`.
        #[must_use]
        pub fn node(&self) -> Entry {
            self.0.node.clone().into()
        }
    }

    /// Connection of the ledger [`Entry`] list.
    #[derive(Clone, Debug, From, Into)]
    pub struct Connection(read::ledger::list::Connection);

    /// Connection of the `LedgerEntry` list.
    #[graphql_object(name = "LedgerListConnection", context = Context)]
    impl Connection {
        /// Edges in this `LedgerListConnection`.
        #[must_use]
        pub fn edges(&self) -> Vec<Edge> {
            self.0.edges.iter().cloned().map(Into::into).collect()
        }

        /// Indicator whether there is a next page.
        #[must_use]
        pub fn has_next_page(&self) -> bool {
            self.0.page_info().has_next_page
        }

        /// End cursor of the page.
        #[must_use]
        pub fn end_cursor(&self) -> Option<Cursor> {
            self.0.edges.last().map(|e| e.cursor.into())
        }
    }
}
