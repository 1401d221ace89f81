//! Entry points for use with Tokio runtimes.
//!
//! Tokio's streams implement tokio's own I/O traits; we wrap them with
//! [`tokio_util::compat`] so that the rest of sockslite can use the
//! [`futures::io`] traits everywhere.

use crate::traits::{DnsProvider, HalfClose, SleepProvider, TcpListener, TcpProvider};

use async_trait::async_trait;
use futures::future::FutureObj;
use futures::task::{Spawn, SpawnError};
use std::future::Future;
use std::io::Result as IoResult;
use std::net::SocketAddr;
use std::time::Duration;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

/// A TCP stream, as returned by [`TokioRuntimeHandle`].
pub type TcpStream = Compat<tokio_crate::net::TcpStream>;

/// An owned tokio runtime.
///
/// This type owns the worker threads: dropping it shuts them down.  To
/// hand the runtime to other code, use [`TokioRuntime::handle()`].
#[derive(Debug)]
pub struct TokioRuntime {
    /// The underlying runtime.
    runtime: tokio_crate::runtime::Runtime,
}

/// A cheaply cloneable reference to a running tokio runtime.
///
/// This is the type that implements [`Runtime`](crate::Runtime).
#[derive(Clone, Debug)]
pub struct TokioRuntimeHandle {
    /// The underlying handle.
    handle: tokio_crate::runtime::Handle,
}

/// A TCP listener, as returned by [`TokioRuntimeHandle::listen()`].
#[derive(Debug)]
pub struct TokioListener {
    /// The underlying listener.
    listener: tokio_crate::net::TcpListener,
}

/// Create a new multi-threaded tokio runtime.
///
/// Generally you should call this function only once, and then use
/// [`TokioRuntime::handle()`] to get references to that runtime.
pub fn create_runtime() -> IoResult<TokioRuntime> {
    let runtime = tokio_crate::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    Ok(TokioRuntime { runtime })
}

impl TokioRuntime {
    /// Return a handle that can spawn tasks on this runtime.
    pub fn handle(&self) -> TokioRuntimeHandle {
        TokioRuntimeHandle::new(self.runtime.handle().clone())
    }

    /// Run `future` to completion on this runtime, blocking the current
    /// thread.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

impl TokioRuntimeHandle {
    /// Wrap an existing tokio handle.
    pub fn new(handle: tokio_crate::runtime::Handle) -> Self {
        TokioRuntimeHandle { handle }
    }
}

impl Spawn for TokioRuntimeHandle {
    fn spawn_obj(&self, future: FutureObj<'static, ()>) -> Result<(), SpawnError> {
        // Dropping the JoinHandle detaches the task; it keeps running.
        let _detached = self.handle.spawn(future);
        Ok(())
    }
}

impl SleepProvider for TokioRuntimeHandle {
    type SleepFuture = tokio_crate::time::Sleep;
    fn sleep(&self, duration: Duration) -> Self::SleepFuture {
        let _guard = self.handle.enter();
        tokio_crate::time::sleep(duration)
    }
}

#[async_trait]
impl TcpProvider for TokioRuntimeHandle {
    type TcpStream = TcpStream;
    type TcpListener = TokioListener;

    async fn connect(&self, addr: &SocketAddr) -> IoResult<Self::TcpStream> {
        let stream = tokio_crate::net::TcpStream::connect(addr).await?;
        Ok(stream.compat())
    }

    async fn listen(&self, addr: &SocketAddr) -> IoResult<Self::TcpListener> {
        let listener = tokio_crate::net::TcpListener::bind(*addr).await?;
        Ok(TokioListener { listener })
    }
}

#[async_trait]
impl TcpListener for TokioListener {
    type TcpStream = TcpStream;

    async fn accept(&self) -> IoResult<(Self::TcpStream, SocketAddr)> {
        let (stream, addr) = self.listener.accept().await?;
        Ok((stream.compat(), addr))
    }

    fn local_addr(&self) -> IoResult<SocketAddr> {
        self.listener.local_addr()
    }
}

#[async_trait]
impl DnsProvider for TokioRuntimeHandle {
    async fn resolve(&self, addr: &str) -> IoResult<Vec<SocketAddr>> {
        let addrs = tokio_crate::net::lookup_host(addr).await?;
        Ok(addrs.collect())
    }
}

impl HalfClose for TcpStream {}
