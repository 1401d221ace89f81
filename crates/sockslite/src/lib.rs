//! A minimal SOCKS5 proxy.
//!
//! Each accepted connection goes through the SOCKS5 handshake, one
//! CONNECT request, a dial through an [`Outbound`](sockslite_outbound::Outbound)
//! connector, and then a [`relay`] of bytes in both directions until both
//! sides are done.
//!
//! The pieces, from the bottom up:
//!
//!   * [`relay::relay`] pumps bytes between two streams, propagating
//!     half-close.
//!   * [`handle_socks_conn`] drives one client connection from handshake
//!     to teardown.
//!   * [`proxy::run_socks_proxy`] accepts connections and runs one
//!     session per connection.
//!   * [`cfg`] loads the configuration for the `sockslite` binary.

#![warn(missing_docs)]

pub mod cfg;
mod err;
pub mod proxy;
pub mod relay;
mod session;

pub use err::Error;
pub use session::handle_socks_conn;

/// A Result type for the sockslite crate.
pub type Result<T> = std::result::Result<T, Error>;
