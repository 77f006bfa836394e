//! Cursor-based pagination primitives.

use std::fmt;

/// Page of `I` nodes addressed by `C` cursors.
#[derive(Clone, Debug)]
pub struct Connection<C, I> {
    /// [`Edge`]s of this page, in the requested order.
    pub edges: Vec<Edge<C, I>>,

    /// [`Kind`] of pagination that produced this page.
    pub kind: Kind,

    /// Whether more [`Edge`]s exist past this page in the requested
    /// direction.
    pub has_more: bool,
}

/// A page in a [`Connection`].
pub type Page<C, I> = Connection<C, I>;

impl<C, I> Connection<C, I> {
    /// Creates a new [`Connection`] answering the provided [`Arguments`].
    #[must_use]
    pub fn new(
        args: &Arguments<C>,
        edges: impl IntoIterator<Item = impl Into<Edge<C, I>>>,
        has_more: bool,
    ) -> Self {
        Self {
            edges: edges.into_iter().map(Into::into).collect(),
            kind: args.kind(),
            has_more,
        }
    }

    /// Returns [`PageInfo`] describing this [`Connection`].
    #[must_use]
    pub fn page_info(&self) -> PageInfo<C>
    where
        C: Clone,
    {
        PageInfo {
            end_cursor: self.edges.last().map(|e| e.cursor.clone()),
            has_next_page: self.has_more && self.kind.is_forward(),
            has_previous_page: self.has_more && self.kind.is_backward(),
        }
    }
}

/// Information about a page of a [`Connection`].
#[derive(Clone, Copy, Debug)]
pub struct PageInfo<C> {
    /// Cursor of the last [`Edge`] on the page.
    pub end_cursor: Option<C>,

    /// Whether a page follows this one.
    pub has_next_page: bool,

    /// Whether a page precedes this one.
    pub has_previous_page: bool,
}

/// Node of a [`Connection`] along with its cursor.
#[derive(Clone, Copy, Debug)]
pub struct Edge<C, I> {
    /// Cursor pointing at the `node`.
    pub cursor: C,

    /// The node itself.
    pub node: I,
}

impl<C, I> From<(C, I)> for Edge<C, I> {
    fn from((cursor, node): (C, I)) -> Self {
        Self { cursor, node }
    }
}

/// Requested page of a [`Connection`].
#[derive(Clone, Copy, Debug)]
pub enum Arguments<C> {
    /// Page following the `after` cursor.
    Forward {
        /// Maximum number of nodes.
        first: usize,

        /// Cursor to start after.
        after: Option<C>,

        /// Whether the node at `after` belongs to the page itself.
        including: bool,
    },

    /// Page preceding the `before` cursor.
    Backward {
        /// Maximum number of nodes.
        last: usize,

        /// Cursor to end before.
        before: Option<C>,

        /// Whether the node at `before` belongs to the page itself.
        including: bool,
    },
}

impl<C> Arguments<C> {
    /// Interprets the [Relay-style] pagination arguments.
    ///
    /// Requesting equal `after` and `before` cursors selects the node at the
    /// cursor inclusively, which is how single nodes are looked up.
    ///
    /// [`None`] is returned if the combination is ambiguous or a count
    /// doesn't fit into [`usize`].
    ///
    /// [Relay-style]: https://relay.dev/graphql/connections.htm
    pub fn new<N>(
        first: Option<N>,
        after: Option<C>,
        last: Option<N>,
        before: Option<C>,
        default: N,
    ) -> Option<Self>
    where
        C: PartialEq + fmt::Debug,
        N: TryInto<usize> + fmt::Debug,
    {
        let pinned = matches!((&after, &before), (Some(a), Some(b)) if a == b);
        let count = |n: N| n.try_into().ok();

        Some(match (first, last) {
            (Some(_), Some(_)) => return None,
            (None, None) if after.is_none() && before.is_none() => {
                Self::Forward {
                    first: count(default)?,
                    after: None,
                    including: false,
                }
            }
            (None, None) if pinned => Self::Forward {
                first: 1,
                after,
                including: true,
            },
            (Some(first), None) if before.is_none() || pinned => {
                Self::Forward {
                    first: count(first)?,
                    after,
                    including: pinned,
                }
            }
            (None, Some(last)) if after.is_none() || pinned => {
                Self::Backward {
                    last: count(last)?,
                    before,
                    including: pinned,
                }
            }
            _ => return None,
        })
    }

    /// Returns the cursor of the only node requested, if these
    /// [`Arguments`] pin a single node.
    pub fn exact_cursor(&self) -> Option<&C> {
        match self {
            Self::Forward {
                first: 1,
                after: cursor,
                including: true,
            }
            | Self::Backward {
                last: 1,
                before: cursor,
                including: true,
            } => cursor.as_ref(),
            Self::Forward { .. } | Self::Backward { .. } => None,
        }
    }

    /// Returns the cursor to paginate from.
    #[must_use]
    pub fn cursor(&self) -> Option<&C> {
        match self {
            Self::Forward { after, .. } => after.as_ref(),
            Self::Backward { before, .. } => before.as_ref(),
        }
    }

    /// Returns the [`Kind`] of pagination requested.
    pub fn kind(&self) -> Kind {
        match *self {
            Self::Forward { including: false, .. } => Kind::Forward,
            Self::Forward { including: true, .. } => Kind::ForwardIncluding,
            Self::Backward { including: false, .. } => Kind::Backward,
            Self::Backward { including: true, .. } => Kind::BackwardIncluding,
        }
    }

    /// Returns the maximum number of nodes requested.
    #[must_use]
    pub fn limit(&self) -> usize {
        match *self {
            Self::Forward { first: n, .. } | Self::Backward { last: n, .. } => n,
        }
    }
}

/// [`Arguments`] along with a filter to apply.
#[derive(Clone, Copy, Debug)]
pub struct Selector<C, F> {
    /// Requested page.
    pub arguments: Arguments<C>,

    /// Filter narrowing the nodes.
    pub filter: F,
}

/// Direction of pagination.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    /// Nodes after the cursor.
    Forward,

    /// Nodes after the cursor and the one at it.
    ForwardIncluding,

    /// Nodes before the cursor.
    Backward,

    /// Nodes before the cursor and the one at it.
    BackwardIncluding,
}

impl Kind {
    /// Whether this [`Kind`] moves forward.
    #[must_use]
    pub fn is_forward(&self) -> bool {
        matches!(self, Self::Forward | Self::ForwardIncluding)
    }

    /// Whether this [`Kind`] moves backward.
    #[must_use]
    pub fn is_backward(&self) -> bool {
        !self.is_forward()
    }

    /// Returns the comparison operator selecting nodes relative to the
    /// cursor.
    #[must_use]
    pub const fn operator(&self) -> &'static str {
        match self {
            Self::Forward => ">",
            Self::ForwardIncluding => ">=",
            Self::Backward => "<",
            Self::BackwardIncluding => "<=",
        }
    }

    /// Returns the [`Order`] nodes are fetched in.
    #[must_use]
    pub const fn order(&self) -> Order {
        match self {
            Self::Forward | Self::ForwardIncluding => Order::Ascending,
            Self::Backward | Self::BackwardIncluding => Order::Descending,
        }
    }
}

/// Sorting order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Order {
    /// Smallest first.
    Ascending,

    /// Largest first.
    Descending,
}

impl Order {
    /// Returns the SQL keyword of this [`Order`].
    #[cfg(feature = "postgres")]
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Defines the pagination type aliases for a list of `$node`s addressed by
/// `$cursor`s and filtered by `$filter`.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($cursor:ty, $node:ty, $filter:ty) => {
        #[doc = "Edge of a [`Connection`]."]
        pub type Edge = $crate::pagination::Edge<$cursor, $node>;

        #[doc = "Paginated list of nodes."]
        pub type Connection = $crate::pagination::Connection<$cursor, $node>;

        #[doc = "A single page of a [`Connection`]."]
        pub type Page = $crate::pagination::Page<$cursor, $node>;

        #[doc = "Information about a [`Page`]."]
        pub type PageInfo = $crate::pagination::PageInfo<$cursor>;

        #[doc = "Arguments selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments<$cursor>;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$cursor, $filter>;
    };
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Connection, Kind};

    type Args = Arguments<u32>;

    #[test]
    fn defaults_to_first_page() {
        let args = Args::new(None, None, None, None, 10).unwrap();

        assert_eq!(args.kind(), Kind::Forward);
        assert_eq!(args.limit(), 10);
        assert_eq!(args.cursor(), None);
    }

    #[test]
    fn pins_single_node() {
        let args = Args::new(None, Some(7), None, Some(7), 10).unwrap();

        assert_eq!(args.exact_cursor(), Some(&7));
        assert_eq!(args.kind(), Kind::ForwardIncluding);
        assert_eq!(args.limit(), 1);
    }

    #[test]
    fn pages_backward() {
        let args = Args::new(None, None, Some(5), Some(3), 10).unwrap();

        assert_eq!(args.kind(), Kind::Backward);
        assert_eq!(args.cursor(), Some(&3));
        assert_eq!(args.exact_cursor(), None);
    }

    #[test]
    fn rejects_ambiguous_arguments() {
        assert!(Args::new(Some(1), None, Some(1), None, 10).is_none());
        assert!(Args::new(Some(1), Some(1), None, Some(2), 10).is_none());
        assert!(Args::new(None, Some(1), Some(1), Some(2), 10).is_none());
        assert!(Args::new(Some(-1), None, None, None, 10).is_none());
    }

    #[test]
    fn reports_page_info() {
        let args = Args::new(Some(2), None, None, None, 10).unwrap();
        let conn = Connection::<u32, &str>::new(&args, [(1, "a"), (2, "b")], true);

        let info = conn.page_info();
        assert!(info.has_next_page);
        assert!(!info.has_previous_page);
        assert_eq!(info.end_cursor, Some(2));
    }
}
