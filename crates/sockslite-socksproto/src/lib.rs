//! Implements the server side of SOCKS5, as used by sockslite.
//!
//! SOCKS is an old and somewhat janky protocol for telling a TCP
//! proxy where to connect.  This crate supports only the small corner
//! of SOCKS5 that a plain CONNECT proxy needs: "no authentication", and
//! the CONNECT command to an IPv4, IPv6, or hostname destination.
//!
//! The handshake runs in two steps, each of which reads exactly the
//! bytes it needs from the client and no more:
//!
//!   * [`negotiate`] picks an authentication method;
//!   * [`read_request`] decodes the client's request into a
//!     [`SocksRequest`].
//!
//! Once the caller knows whether it could reach the destination, it
//! answers with [`send_reply`].
//!
//! SOCKS5 is specified in [RFC 1928](https://tools.ietf.org/html/rfc1928).

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(clippy::exhaustive_enums)]
#![deny(clippy::exhaustive_structs)]

mod err;
mod handshake;
mod msg;

pub use err::Error;
pub use handshake::{encode_reply, negotiate, read_request, select_method, send_reply};
pub use msg::{AddrType, AuthMethod, SocksAddr, SocksCmd, SocksRequest, SocksStatus};

/// The only SOCKS protocol version that we speak.
pub const SOCKS5_VERSION: u8 = 5;

/// A Result type for the sockslite_socksproto crate.
pub type Result<T> = std::result::Result<T, Error>;
