//! Declarations for traits that we need our runtimes to implement.

use async_trait::async_trait;
use futures::{AsyncRead, AsyncWrite, Future};
use std::io::Result as IoResult;
use std::net::SocketAddr;
use std::time::Duration;

pub use futures::task::Spawn;

/// A runtime that we can use to run a proxy.
///
/// This trait comprises several other traits that we require all of our
/// runtimes to provide:
///
/// * [`futures::task::Spawn`] to launch new background tasks.
/// * [`SleepProvider`] to pause a task for a given amount of time.
/// * [`TcpProvider`] to launch and accept TCP connections.
/// * [`DnsProvider`] to turn `host:port` strings into socket addresses.
pub trait Runtime:
    Sync + Send + Spawn + Clone + SleepProvider + TcpProvider + DnsProvider + 'static
{
}

impl<T> Runtime for T where
    T: Sync + Send + Spawn + Clone + SleepProvider + TcpProvider + DnsProvider + 'static
{
}

/// Trait for a runtime that can wait until a timer has expired.
pub trait SleepProvider {
    /// A future returned by [`SleepProvider::sleep()`]
    type SleepFuture: Future<Output = ()> + Send + 'static;
    /// Return a future that will be ready after `duration` has
    /// elapsed.
    fn sleep(&self, duration: Duration) -> Self::SleepFuture;
}

/// A byte stream that may be able to stop writing while it keeps reading.
///
/// When a stream supports half-close, calling `close()` on its write
/// side tells the peer "no more data is coming" while data can still
/// arrive in the other direction.  For TCP this is `shutdown(Write)`.
///
/// Transports that can only close entirely should return `false`, so
/// that callers skip the close instead of truncating the other direction.
pub trait HalfClose {
    /// Return true if closing this stream's write side leaves its read
    /// side usable.
    fn supports_half_close(&self) -> bool {
        true
    }
}

/// Trait for a runtime that can create and accept TCP connections.
#[async_trait]
pub trait TcpProvider {
    /// The type for the TCP connections returned by [`Self::connect()`].
    type TcpStream: AsyncRead + AsyncWrite + HalfClose + Send + Sync + Unpin + 'static;
    /// The type for the TCP listeners returned by [`Self::listen()`].
    type TcpListener: TcpListener<TcpStream = Self::TcpStream> + Send + Sync + Unpin + 'static;

    /// Launch a TCP connection to a given socket address.
    async fn connect(&self, addr: &SocketAddr) -> IoResult<Self::TcpStream>;

    /// Open a TCP listener on a given socket address.
    async fn listen(&self, addr: &SocketAddr) -> IoResult<Self::TcpListener>;
}

/// Trait for a local socket that accepts incoming TCP streams.
#[async_trait]
pub trait TcpListener {
    /// The type of TCP connections returned by [`Self::accept()`].
    type TcpStream: AsyncRead + AsyncWrite + HalfClose + Send + Sync + Unpin + 'static;

    /// Wait for an incoming stream; return it along with its address.
    async fn accept(&self) -> IoResult<(Self::TcpStream, SocketAddr)>;

    /// Return the local address that this listener is bound to.
    fn local_addr(&self) -> IoResult<SocketAddr>;
}

/// Trait for a runtime that can look up the addresses for a host.
#[async_trait]
pub trait DnsProvider {
    /// Resolve `addr`, which must have the form `host:port`, into a list
    /// of socket addresses.
    ///
    /// IP literals are returned without any lookup.
    async fn resolve(&self, addr: &str) -> IoResult<Vec<SocketAddr>>;
}
