//! In-memory streams for testing code that expects a network.
//!
//! Please remember that this module only exists for writing tests.

use crate::traits::HalfClose;

use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

/// Capacity of each direction of a [`stream_pair`], in bytes.
const PIPE_CAPACITY: usize = 64 * 1024;

/// One end of an in-memory byte stream, created with [`stream_pair`].
///
/// Closing a `LocalStream` for writing delivers end-of-stream to its peer
/// but leaves the other direction open, the way TCP half-close does.
/// Dropping it closes both directions.
pub type LocalStream = Compat<tokio_crate::io::DuplexStream>;

/// Return a pair of connected [`LocalStream`]s.
///
/// Bytes written to one are readable from the other.
pub fn stream_pair() -> (LocalStream, LocalStream) {
    let (a, b) = tokio_crate::io::duplex(PIPE_CAPACITY);
    (a.compat(), b.compat())
}

impl HalfClose for LocalStream {}
