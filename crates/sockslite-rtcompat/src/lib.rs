//! Compatibility between different async runtimes for sockslite.
//!
//! We try to isolate these dependencies in a single place so that the
//! rest of sockslite depends only on the minimal set of features that a
//! proxy needs from its runtime: spawning tasks, sleeping, opening and
//! accepting TCP connections, and resolving hostnames.
//!
//! Right now the only backend is tokio.  Other crates should be written
//! against the [`Runtime`] trait rather than against tokio directly, so
//! that tests (and other backends) can substitute their own.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(clippy::await_holding_lock)]

pub mod mock;
mod timer;
pub mod tokio;
mod traits;


pub use timer::{SleepProviderExt, Timeout, TimeoutError};
pub use traits::{
    DnsProvider, HalfClose, Runtime, SleepProvider, Spawn, TcpListener, TcpProvider,
};

use std::future::Future;

/// Run a test function using a freshly created tokio [`Runtime`].
///
/// The runtime is dropped once `func`'s future completes.
pub fn test_with_runtime<P, F, O>(func: P) -> O
where
    P: FnOnce(crate::tokio::TokioRuntimeHandle) -> F,
    F: Future<Output = O>,
{
    let runtime = crate::tokio::create_runtime().expect("Unable to create a tokio runtime");
    let handle = runtime.handle();
    runtime.block_on(func(handle))
}
