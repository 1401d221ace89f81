//! Declare an error type for a SOCKS session.

use thiserror::Error;

/// An error that ends a single SOCKS session.
///
/// None of these affect any other connection.  By the time one is
/// returned, the client has received whatever reply the protocol allows
/// and the destination stream (if any) has been closed.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The method-negotiation step failed.
    #[error("SOCKS handshake failed: {0}")]
    Handshake(#[source] sockslite_socksproto::Error),

    /// The client's request was unreadable or unsupported.
    #[error("Bad SOCKS request: {0}")]
    Request(#[source] sockslite_socksproto::Error),

    /// We couldn't reach the destination.
    ///
    /// The client was only told "host unreachable"; the details are
    /// here for logging.
    #[error("Unable to reach {addr} through {outbound}: {source}")]
    Dial {
        /// The destination, as `host:port`.
        addr: String,
        /// Name of the outbound connector we used.
        outbound: String,
        /// What went wrong.
        #[source]
        source: sockslite_outbound::Error,
    },

    /// We reached the destination but couldn't tell the client.
    #[error("Couldn't send SOCKS reply: {0}")]
    Reply(#[source] sockslite_socksproto::Error),

    /// One direction of the relay failed after it started.
    #[error("Relay failed: {0}")]
    Relay(#[source] std::io::Error),

    /// The runtime wouldn't let us start a relay task.
    #[error("Unable to spawn relay task: {0}")]
    Spawn(#[from] futures::task::SpawnError),
}
