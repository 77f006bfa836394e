//! GraphQL API definitions.

/// Defines a GraphQL enum mirroring a domain kind enum, along with the
/// [`From`] conversions in both directions.
///
/// Variants are also deserializable from their GraphQL names, so the same
/// values are accepted in URL queries.
macro_rules! define_enum {
    (
        #[doc = $doc:literal]
        #[graphql(name = $gql_name:literal)]
        enum $name:ident = $domain:path {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident
            ),+ $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            ::serde::Deserialize,
            Eq,
            ::juniper::GraphQLEnum,
            PartialEq,
        )]
        #[doc = $doc]
        #[graphql(name = $gql_name)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $(
                #[doc = $variant_doc]
                $variant,
            )+
        }

        impl From<$domain> for $name {
            fn from(kind: $domain) -> Self {
                type Kind = $domain;
                match kind {
                    $(Kind::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$name> for $domain {
            fn from(kind: $name) -> Self {
                match kind {
                    $($name::$variant => Self::$variant,)+
                }
            }
        }
    };
}

pub mod booking;
pub mod discount;
pub mod ledger;
mod mutation;
pub mod pricing;
mod query;
pub mod scalar;
pub mod user;

use juniper::EmptySubscription;

use crate::{define_error, Context};

pub use self::{
    booking::Booking, mutation::Mutation, query::Query, user::User,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

/// Creates a new [`Schema`].
#[must_use]
pub fn schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}

define_error! {
    enum PrivilegeError {
        #[code = "NOT_OPERATOR"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be an operator"]
        Operator,
    }
}

define_error! {
    enum PaginationError {
        #[code = "AMBIGUOUS_PAGINATION_ARGUMENTS"]
        #[status = BAD_REQUEST]
        #[message = "Ambiguous pagination arguments"]
        Ambiguous,
    }
}

define_error! {
    enum InputError {
        #[code = "INVALID_COUNT"]
        #[status = BAD_REQUEST]
        #[message = "Counts must be between 0 and 65535"]
        Count,

        #[code = "INVALID_PASSENGERS"]
        #[status = BAD_REQUEST]
        #[message = "Number of passengers must be between 1 and 200"]
        Passengers,
    }
}
