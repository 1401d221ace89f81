//! Outbound connectors for sockslite.
//!
//! Once a SOCKS session knows where its client wants to go, it asks an
//! [`Outbound`] for a stream to that destination.  The session doesn't
//! care how the stream is made, so other egress paths can be swapped in
//! without touching the SOCKS logic.
//!
//! The only connector here is [`Direct`], which makes a plain TCP
//! connection.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

mod direct;
mod err;

pub use direct::{Direct, DEFAULT_CONNECT_TIMEOUT};
pub use err::Error;

use async_trait::async_trait;
use futures::io::{AsyncRead, AsyncWrite};
use sockslite_rtcompat::HalfClose;

/// A Result type for the sockslite_outbound crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A way to open connections to the destinations that clients request.
#[async_trait]
pub trait Outbound: Send + Sync {
    /// The type of stream that [`Outbound::dial`] returns.
    type Stream: AsyncRead + AsyncWrite + HalfClose + Send + Unpin + 'static;

    /// Return a short name for this connector, for use in log messages.
    fn name(&self) -> &str;

    /// Open a stream to `address`, which has the form `host:port`.
    ///
    /// Implementations must bound how long they spend trying.
    async fn dial(&self, address: &str) -> Result<Self::Stream>;
}
