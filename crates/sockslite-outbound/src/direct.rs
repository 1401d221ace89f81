//! An outbound connector that dials the destination over plain TCP.

use crate::{Error, Outbound, Result};

use async_trait::async_trait;
use sockslite_rtcompat::{Runtime, SleepProviderExt};
use std::time::Duration;
use tracing::debug;

/// How long [`Direct`] spends on a connection unless told otherwise.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connects straight to the requested destination, using the runtime's
/// own resolver and TCP stack.
#[derive(Clone, Debug)]
pub struct Direct<R> {
    /// Runtime used for resolution, connecting, and the timeout.
    runtime: R,
    /// Upper bound on resolving plus connecting.
    connect_timeout: Duration,
}

impl<R: Runtime> Direct<R> {
    /// Make a new Direct connector with [`DEFAULT_CONNECT_TIMEOUT`].
    pub fn new(runtime: R) -> Self {
        Self::with_timeout(runtime, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Make a new Direct connector that gives up after `connect_timeout`.
    pub fn with_timeout(runtime: R, connect_timeout: Duration) -> Self {
        Direct {
            runtime,
            connect_timeout,
        }
    }

    /// Return the timeout for this connector.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Resolve `address`, then try each of its socket addresses in turn
    /// until one accepts.
    async fn connect_any(&self, address: &str) -> Result<R::TcpStream> {
        let addrs = self
            .runtime
            .resolve(address)
            .await
            .map_err(|source| Error::Resolve {
                addr: address.to_string(),
                source,
            })?;

        let mut last_err = None;
        for addr in addrs {
            match self.runtime.connect(&addr).await {
                Ok(stream) => {
                    debug!("Connected to {} via {}", address, addr);
                    return Ok(stream);
                }
                Err(e) => {
                    debug!("Connection to {} via {} failed: {}", address, addr, e);
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(source) => Err(Error::Connect {
                addr: address.to_string(),
                source,
            }),
            None => Err(Error::NoAddresses(address.to_string())),
        }
    }
}

/// Return true if `address` looks like `host:port`.
fn has_host_and_port(address: &str) -> bool {
    match address.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}

#[async_trait]
impl<R: Runtime> Outbound for Direct<R> {
    type Stream = R::TcpStream;

    fn name(&self) -> &str {
        "direct"
    }

    async fn dial(&self, address: &str) -> Result<Self::Stream> {
        if !has_host_and_port(address) {
            return Err(Error::BadAddress(address.to_string()));
        }

        match self
            .runtime
            .timeout(self.connect_timeout, self.connect_any(address))
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::Timeout {
                addr: address.to_string(),
                timeout: self.connect_timeout,
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use futures::io::{AsyncReadExt, AsyncWriteExt};
    use futures::task::SpawnExt;
    use sockslite_rtcompat::{test_with_runtime, TcpListener, TcpProvider};
    use std::net::SocketAddr;

    #[test]
    fn address_shape() {
        assert!(has_host_and_port("127.0.0.1:80"));
        assert!(has_host_and_port("[::1]:80"));
        assert!(has_host_and_port("example.com:0"));
        assert!(!has_host_and_port("example.com"));
        assert!(!has_host_and_port(":80"));
        assert!(!has_host_and_port("example.com:99999"));
    }

    #[test]
    fn dial_local() {
        test_with_runtime(|rt| async move {
            let localhost: SocketAddr = "127.0.0.1:0".parse().unwrap();
            let listener = rt.listen(&localhost).await.unwrap();
            let addr = listener.local_addr().unwrap();

            let server = rt
                .spawn_with_handle(async move {
                    let (mut conn, _) = listener.accept().await.unwrap();
                    conn.write_all(b"hi").await.unwrap();
                    conn.close().await.unwrap();
                })
                .unwrap();

            let direct = Direct::new(rt.clone());
            assert_eq!(direct.name(), "direct");
            assert_eq!(direct.connect_timeout(), DEFAULT_CONNECT_TIMEOUT);

            let mut stream = direct.dial(&addr.to_string()).await.unwrap();
            let mut got = Vec::new();
            stream.read_to_end(&mut got).await.unwrap();
            assert_eq!(&got[..], b"hi");
            server.await;
        });
    }

    #[test]
    fn dial_refused() {
        test_with_runtime(|rt| async move {
            // Find a port that nobody is listening on.
            let localhost: SocketAddr = "127.0.0.1:0".parse().unwrap();
            let listener = rt.listen(&localhost).await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);

            let direct = Direct::with_timeout(rt.clone(), Duration::from_secs(5));
            let e = direct.dial(&addr.to_string()).await;
            assert!(matches!(e, Err(Error::Connect { .. })));
        });
    }

    #[test]
    fn dial_bad_address() {
        test_with_runtime(|rt| async move {
            let direct = Direct::new(rt.clone());
            let e = direct.dial("no-port-here").await;
            assert!(matches!(e, Err(Error::BadAddress(_))));
        });
    }
}
