//! Wallet ledger read model definition.

pub mod list {
    //! Ledger [`Entry`]s list definitions.

    use common::define_pagination;

    #[cfg(doc)]
    use crate::domain::User;
    use crate::domain::{
        ledger::{self, Entry},
        user,
    };

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = Entry;

    /// Cursor pointing to a specific [`Entry`] in a list.
    pub type Cursor = ledger::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug)]
    pub struct Filter {
        /// ID of the [`User`] whose [`Entry`]s are listed.
        pub user_id: user::Id,
    }
}
