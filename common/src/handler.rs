//! [`Handler`] abstraction.

use std::future::Future;

/// Something executable with `Args` producing a [`Result`] asynchronously.
///
/// Commands, queries and database operations are all [`Handler`]s, differing
/// only in the `Args` they accept.
pub trait Handler<Args = ()> {
    /// Successful outcome.
    type Ok;

    /// Failed outcome.
    type Err;

    /// Executes this [`Handler`] with the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
