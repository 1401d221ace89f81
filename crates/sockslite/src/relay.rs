//! Relay bytes in both directions between two connected streams.
//!
//! [`relay()`] runs one task per direction.  When a direction reaches
//! end-of-stream, it half-closes its destination so the peer learns that
//! no more data is coming, while the opposite direction keeps running.
//! The relay is over only once both directions are.

use crate::{Error, Result};

use futures::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use futures::task::{Spawn, SpawnExt};
use sockslite_rtcompat::HalfClose;
use std::io::Result as IoResult;
use tracing::debug;

/// Size of the buffer each direction uses for copying.
const BUF_LEN: usize = 4096;

/// How many bytes went each way during a [`relay()`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(clippy::exhaustive_structs)]
pub struct Transferred {
    /// Bytes read from the first stream and written to the second.
    pub a_to_b: u64,
    /// Bytes read from the second stream and written to the first.
    pub b_to_a: u64,
}

/// Copy bytes from `a` to `b` and from `b` to `a` until both directions
/// have finished.
///
/// Each direction runs as its own task on `runtime`.  A direction
/// finishes when its source reaches end-of-stream or fails.  Either way,
/// it then closes its destination for writing, if the destination
/// [supports half-close](HalfClose::supports_half_close); otherwise it
/// just flushes, so the other direction isn't cut short.
///
/// Returns an error if either direction failed.  If both did, the
/// `a`-to-`b` error wins.  Ending cleanly on both sides is success.
pub async fn relay<R, A, B>(runtime: &R, a: A, b: B) -> Result<Transferred>
where
    R: Spawn,
    A: AsyncRead + AsyncWrite + HalfClose + Send + Unpin + 'static,
    B: AsyncRead + AsyncWrite + HalfClose + Send + Unpin + 'static,
{
    let a_half_close = a.supports_half_close();
    let b_half_close = b.supports_half_close();
    let (a_r, a_w) = a.split();
    let (b_r, b_w) = b.split();

    let a_to_b = runtime.spawn_with_handle(copy_interactive(a_r, b_w, b_half_close))?;
    let b_to_a = runtime.spawn_with_handle(copy_interactive(b_r, a_w, a_half_close))?;

    // Wait for both, so that neither stream is torn down while the other
    // direction might still be moving data.
    let (a_to_b, b_to_a) = futures::join!(a_to_b, b_to_a);

    Ok(Transferred {
        a_to_b: a_to_b.map_err(Error::Relay)?,
        b_to_a: b_to_a.map_err(Error::Relay)?,
    })
}

/// Copy all the data from `reader` into `writer` until we encounter an EOF or
/// an error, and return the number of bytes copied.
///
/// Unlike as futures::io::copy(), this function is meant for use with
/// interactive readers and writers, where the reader might pause for
/// a while, but where we want to send data on the writer as soon as
/// it is available.  It only flushes the writer when the reader has no
/// data ready.
///
/// When the copying is over, `writer` is closed if `half_close` is set,
/// and flushed otherwise.  A failure there is logged but not returned:
/// by then the copy itself has already succeeded or failed.
async fn copy_interactive<R, W>(mut reader: R, mut writer: W, half_close: bool) -> IoResult<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    use futures::{poll, task::Poll};

    let mut buf = [0_u8; BUF_LEN];
    let mut total = 0_u64;

    let loop_result: IoResult<()> = loop {
        let mut read_future = reader.read(&mut buf[..]);
        match poll!(&mut read_future) {
            Poll::Ready(Err(e)) => break Err(e),
            Poll::Ready(Ok(0)) => break Ok(()), // EOF
            Poll::Ready(Ok(n)) => {
                if let Err(e) = writer.write_all(&buf[..n]).await {
                    break Err(e);
                }
                total += n as u64;
                continue;
            }
            Poll::Pending => {
                if let Err(e) = writer.flush().await {
                    break Err(e);
                }
            }
        }

        // The read future is pending, so we should wait on it.
        match read_future.await {
            Err(e) => break Err(e),
            Ok(0) => break Ok(()),
            Ok(n) => {
                if let Err(e) = writer.write_all(&buf[..n]).await {
                    break Err(e);
                }
                total += n as u64;
            }
        }
    };

    let finish = if half_close {
        writer.close().await
    } else {
        writer.flush().await
    };
    if let Err(e) = finish {
        debug!("Unable to finish writing after relay: {}", e);
    }

    loop_result.map(|()| total)
}
