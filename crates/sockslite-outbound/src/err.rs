//! Declare an error type for sockslite_outbound

use std::time::Duration;
use thiserror::Error;

/// An error returned while trying to reach a destination.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The address wasn't of the form `host:port`.
    #[error("Invalid destination address {0:?}")]
    BadAddress(String),

    /// We couldn't look up the host.
    #[error("Unable to resolve {addr}")]
    Resolve {
        /// The address we tried to resolve.
        addr: String,
        /// What went wrong.
        #[source]
        source: std::io::Error,
    },

    /// The host resolved to no addresses at all.
    #[error("No addresses found for {0}")]
    NoAddresses(String),

    /// The whole attempt took longer than we allow.
    #[error("Connecting to {addr} timed out after {timeout:?}")]
    Timeout {
        /// The address we were trying to reach.
        addr: String,
        /// How long we waited.
        timeout: Duration,
    },

    /// Every address we tried refused or failed.
    #[error("Connecting to {addr} failed")]
    Connect {
        /// The address we were trying to reach.
        addr: String,
        /// The error from the last connection attempt.
        #[source]
        source: std::io::Error,
    },
}
