//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler of some `Args`.
///
/// Every command, query and database operation of the portal is expressed as
/// an implementation of this trait for a dedicated argument type, so the same
/// type may handle many different operations:
///
/// ```rust
/// # use common::Handler;
/// struct Store;
///
/// struct CountListings;
///
/// impl Handler<CountListings> for Store {
///     type Ok = u64;
///     type Err = std::convert::Infallible;
///
///     async fn execute(&self, _: CountListings) -> Result<u64, Self::Err> {
///         Ok(0)
///     }
/// }
/// ```
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
