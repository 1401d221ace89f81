//! Drive one SOCKS client connection from handshake to teardown.

use crate::relay::relay;
use crate::{Error, Result};

use futures::io::{AsyncRead, AsyncWrite};
use sockslite_outbound::Outbound;
use sockslite_rtcompat::{HalfClose, Runtime};
use sockslite_socksproto::{self as socksproto, SocksStatus};
use tracing::{debug, info};

/// Given a just-received connection `socks_stream` on a SOCKS port,
/// handle the SOCKS handshake and relay the connection to wherever the
/// client asked, using `outbound` to get there.
///
/// The steps happen in a fixed order, and each failure ends the session:
/// negotiate authentication, read the request, dial the destination,
/// reply, then relay until both directions are finished.  The client gets
/// exactly one reply to its request, unless it isn't speaking SOCKS5
/// at all.
///
/// Ownership of `socks_stream` moves into this function, and the stream
/// is dropped (which closes it) before the function returns, whatever the
/// outcome.  Callers don't close it themselves.  The destination stream
/// is likewise always closed by the time this returns.
pub async fn handle_socks_conn<R, O, S>(runtime: &R, outbound: &O, socks_stream: S) -> Result<()>
where
    R: Runtime,
    O: Outbound + ?Sized,
    S: AsyncRead + AsyncWrite + HalfClose + Send + Unpin + 'static,
{
    let mut socks_stream = socks_stream;

    // Part 1: the SOCKS handshake, to learn where we are being asked
    // to connect.
    socksproto::negotiate(&mut socks_stream)
        .await
        .map_err(Error::Handshake)?;
    debug!("SOCKS5 handshake complete");

    let request = socksproto::read_request(&mut socks_stream)
        .await
        .map_err(Error::Request)?;
    let addr = request.address();
    info!("Got a socks request for {}", addr);

    // Part 2: connect to the destination, and tell the client how that
    // went.
    let target = match outbound.dial(&addr).await {
        Ok(s) => s,
        Err(e) => {
            // The client only ever learns that the host was unreachable.
            if let Err(reply_err) =
                socksproto::send_reply(&mut socks_stream, SocksStatus::HOST_UNREACHABLE).await
            {
                debug!("Couldn't tell client that {} is unreachable: {}", addr, reply_err);
            }
            return Err(Error::Dial {
                addr,
                outbound: outbound.name().to_string(),
                source: e,
            });
        }
    };
    info!("Connected to {} (through {})", addr, outbound.name());

    if let Err(e) = socksproto::send_reply(&mut socks_stream, SocksStatus::SUCCEEDED).await {
        drop(target);
        return Err(Error::Reply(e));
    }

    // Part 3: relay traffic until both sides are done.
    let transferred = relay(runtime, socks_stream, target).await?;
    debug!(
        "Relay for {} finished: {} bytes sent, {} bytes received",
        addr, transferred.a_to_b, transferred.b_to_a
    );

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use async_trait::async_trait;
    use futures::channel::oneshot;
    use futures::io::{AsyncReadExt, AsyncWriteExt};
    use futures::lock::Mutex;
    use futures::task::SpawnExt;
    use hex_literal::hex;
    use sockslite_rtcompat::mock::{stream_pair, LocalStream};
    use sockslite_rtcompat::test_with_runtime;
    use std::io::{Error as IoError, ErrorKind, Result as IoResult};
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// An outbound connector that hands out one end of an in-memory
    /// stream, and remembers what it was asked for.
    #[derive(Default)]
    struct PairOutbound {
        /// The far end of the last stream we handed out.
        far_end: Mutex<Option<LocalStream>>,
        /// Every address passed to `dial`.
        dialed: Mutex<Vec<String>>,
        /// If present, `dial` doesn't return until this fires.
        gate: Mutex<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait]
    impl Outbound for PairOutbound {
        type Stream = LocalStream;
        fn name(&self) -> &str {
            "pair"
        }
        async fn dial(&self, address: &str) -> sockslite_outbound::Result<LocalStream> {
            self.dialed.lock().await.push(address.to_string());
            let gate = self.gate.lock().await.take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            let (mine, theirs) = stream_pair();
            *self.far_end.lock().await = Some(theirs);
            Ok(mine)
        }
    }

    /// An outbound connector that can never reach anything.
    struct NowhereOutbound;

    #[async_trait]
    impl Outbound for NowhereOutbound {
        type Stream = LocalStream;
        fn name(&self) -> &str {
            "nowhere"
        }
        async fn dial(&self, address: &str) -> sockslite_outbound::Result<LocalStream> {
            Err(sockslite_outbound::Error::NoAddresses(address.to_string()))
        }
    }

    /// A destination whose reads fail as if the connection was reset.
    struct ResetStream;

    impl HalfClose for ResetStream {}

    impl AsyncRead for ResetStream {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut [u8],
        ) -> Poll<IoResult<usize>> {
            Poll::Ready(Err(IoError::new(ErrorKind::ConnectionReset, "reset")))
        }
    }

    impl AsyncWrite for ResetStream {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<IoResult<usize>> {
            Poll::Ready(Ok(buf.len()))
        }
        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<IoResult<()>> {
            Poll::Ready(Ok(()))
        }
        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<IoResult<()>> {
            Poll::Ready(Ok(()))
        }
    }

    /// An outbound connector whose connections all get reset.
    struct ResetOutbound;

    #[async_trait]
    impl Outbound for ResetOutbound {
        type Stream = ResetStream;
        fn name(&self) -> &str {
            "reset"
        }
        async fn dial(&self, _address: &str) -> sockslite_outbound::Result<ResetStream> {
            Ok(ResetStream)
        }
    }

    /// Greeting plus a CONNECT request for 127.0.0.1:8080.
    const CONNECT_LOCAL_8080: [u8; 13] = hex!("05 01 00 05 01 00 01 7f000001 1f90");

    #[test]
    fn connect_and_relay() -> IoResult<()> {
        test_with_runtime(|rt| async move {
            let outbound = std::sync::Arc::new(PairOutbound::default());
            let (mut client, server_side) = stream_pair();

            let rt2 = rt.clone();
            let ob2 = std::sync::Arc::clone(&outbound);
            let session = rt
                .spawn_with_handle(async move {
                    handle_socks_conn(&rt2, &*ob2, server_side).await
                })
                .unwrap();

            client.write_all(&CONNECT_LOCAL_8080).await?;
            let mut replies = [0_u8; 12];
            client.read_exact(&mut replies).await?;
            assert_eq!(replies, hex!("05 00 05 00 00 01 00000000 0000"));
            assert_eq!(
                &outbound.dialed.lock().await[..],
                &["127.0.0.1:8080".to_string()][..]
            );

            let mut dest = outbound.far_end.lock().await.take().unwrap();
            client.write_all(b"ping").await?;
            let mut got = [0_u8; 4];
            dest.read_exact(&mut got).await?;
            assert_eq!(&got, b"ping");

            dest.write_all(b"pong").await?;
            client.read_exact(&mut got).await?;
            assert_eq!(&got, b"pong");

            client.close().await?;
            dest.close().await?;
            session.await.unwrap();
            Ok(())
        })
    }

    #[test]
    fn dial_failure() -> IoResult<()> {
        test_with_runtime(|rt| async move {
            let (mut client, server_side) = stream_pair();
            client.write_all(&CONNECT_LOCAL_8080).await?;

            let r = handle_socks_conn(&rt, &NowhereOutbound, server_side).await;
            match r {
                Err(Error::Dial { addr, outbound, .. }) => {
                    assert_eq!(addr, "127.0.0.1:8080");
                    assert_eq!(outbound, "nowhere");
                }
                other => panic!("unexpected session outcome {:?}", other),
            }

            // The session is over and its end of the stream is gone, so
            // we can read everything it sent.
            let mut replies = Vec::new();
            client.read_to_end(&mut replies).await?;
            assert_eq!(&replies[..], &hex!("05 00 05 04 00 01 00000000 0000")[..]);
            Ok(())
        })
    }

    #[test]
    fn auth_rejected() -> IoResult<()> {
        test_with_runtime(|rt| async move {
            let outbound = PairOutbound::default();
            let (mut client, server_side) = stream_pair();
            client.write_all(&hex!("05 02 01 02")).await?;

            let r = handle_socks_conn(&rt, &outbound, server_side).await;
            assert!(matches!(
                r,
                Err(Error::Handshake(sockslite_socksproto::Error::NoAcceptableAuth))
            ));

            let mut replies = Vec::new();
            client.read_to_end(&mut replies).await?;
            assert_eq!(&replies[..], &hex!("05 FF")[..]);
            assert!(outbound.dialed.lock().await.is_empty());
            Ok(())
        })
    }

    #[test]
    fn reply_failure_closes_target() -> IoResult<()> {
        test_with_runtime(|rt| async move {
            let (open_gate, gate) = oneshot::channel();
            let outbound = std::sync::Arc::new(PairOutbound {
                gate: Mutex::new(Some(gate)),
                ..PairOutbound::default()
            });
            let (mut client, server_side) = stream_pair();

            let rt2 = rt.clone();
            let ob2 = std::sync::Arc::clone(&outbound);
            let session = rt
                .spawn_with_handle(async move {
                    handle_socks_conn(&rt2, &*ob2, server_side).await
                })
                .unwrap();

            // Send the whole request, wait for the method reply, then go
            // away while the dial is still in progress.
            client.write_all(&CONNECT_LOCAL_8080).await?;
            let mut method = [0_u8; 2];
            client.read_exact(&mut method).await?;
            drop(client);
            open_gate.send(()).unwrap();

            match session.await {
                Err(Error::Reply(_)) => {}
                other => panic!("unexpected session outcome {:?}", other),
            }

            // The destination was dropped rather than relayed to.
            let mut dest = outbound.far_end.lock().await.take().unwrap();
            let mut got = Vec::new();
            dest.read_to_end(&mut got).await?;
            assert!(got.is_empty());
            Ok(())
        })
    }

    #[test]
    fn relay_failure() -> IoResult<()> {
        test_with_runtime(|rt| async move {
            let (mut client, server_side) = stream_pair();
            client.write_all(&CONNECT_LOCAL_8080).await?;
            client.close().await?;

            let r = handle_socks_conn(&rt, &ResetOutbound, server_side).await;
            match r {
                Err(Error::Relay(e)) => assert_eq!(e.kind(), ErrorKind::ConnectionReset),
                other => panic!("unexpected session outcome {:?}", other),
            }

            // The client was told about the connection before it failed.
            let mut replies = Vec::new();
            client.read_to_end(&mut replies).await?;
            assert_eq!(&replies[..], &hex!("05 00 05 00 00 01 00000000 0000")[..]);
            Ok(())
        })
    }
}
