//! Declare an error type for sockslite_socksproto
use crate::msg::{AddrType, SocksCmd};
use thiserror::Error;

/// An error that occurs while negotiating a SOCKS handshake.
///
/// Apart from [`Error::Io`], each of these means that the client asked
/// for something we won't do.  Where the protocol lets us say so, the
/// client has already been told by the time the error is returned.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The client went away, or we couldn't write to it.
    #[error("I/O error while {action}")]
    Io {
        /// What we were doing when the error occurred.
        action: &'static str,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The SOCKS client declared a SOCKS version number that isn't
    /// one we support.
    ///
    /// In all likelihood, this is somebody trying to use the port for
    /// some protocol other than SOCKS.  We send no reply.
    #[error("Unrecognized SOCKS protocol version {0}")]
    BadProtocol(u8),

    /// The client didn't offer "no authentication" among its methods.
    #[error("Client offered no acceptable authentication method")]
    NoAcceptableAuth,

    /// The client asked for a command other than CONNECT.
    #[error("SOCKS command {0} not supported")]
    UnsupportedCommand(SocksCmd),

    /// The client used an address type we don't know.
    #[error("SOCKS address type {0} not supported")]
    UnsupportedAddrType(AddrType),

    /// The client sent a hostname that was empty or not valid UTF-8.
    #[error("Requested hostname was empty or not UTF-8")]
    BadHostname,
}

impl Error {
    /// Return a closure that wraps an I/O error into an [`Error::Io`]
    /// tagged with `action`.
    pub(crate) fn io(action: &'static str) -> impl FnOnce(std::io::Error) -> Error {
        move |source| Error::Io { action, source }
    }
}
