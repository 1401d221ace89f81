//! Listen for SOCKS connections, and run a session for each one.
//!
//! A proxy is launched with [`run_socks_proxy()`], which binds its
//! listeners, then accepts connections forever and hands each one to
//! [`handle_socks_conn()`] in a task of its own.

use futures::stream::{self, StreamExt};
use futures::task::SpawnExt;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use sockslite_outbound::Outbound;
use sockslite_rtcompat::{Runtime, TcpListener};

use crate::handle_socks_conn;

use anyhow::{anyhow, Context, Result};

/// Try to bind a listener on every address in `addrs`.
///
/// An address we can't bind is logged and skipped.  It's only an error
/// if we can't bind any of them.
pub async fn bind_listeners<R: Runtime>(
    runtime: &R,
    addrs: &[SocketAddr],
) -> Result<Vec<R::TcpListener>> {
    let mut listeners = Vec::new();

    for addr in addrs {
        match runtime.listen(addr).await {
            Ok(listener) => {
                info!("Listening on {:?}.", addr);
                listeners.push(listener);
            }
            Err(e) => warn!("Can't listen on {:?}: {}", addr, e),
        }
    }

    // We weren't able to bind any ports: There's nothing to do.
    if listeners.is_empty() {
        error!("Couldn't open any listeners.");
        return Err(anyhow!("Couldn't open any SOCKS listeners"));
    }
    Ok(listeners)
}

/// Accept connections on every listener in `listeners` and run one SOCKS
/// session per connection, dialing out through `outbound`.
///
/// Accept errors are logged and otherwise ignored, as are the errors from
/// individual sessions.  This only returns if the runtime refuses to
/// spawn a task.
pub async fn serve<R, O>(runtime: R, outbound: Arc<O>, listeners: Vec<R::TcpListener>) -> Result<()>
where
    R: Runtime,
    O: Outbound + 'static,
{
    // Create a stream of (incoming socket, listener_id) pairs, selected
    // across all the listeners.
    let mut incoming = stream::select_all(listeners.into_iter().enumerate().map(
        |(listener_id, listener)| {
            Box::pin(stream::unfold(listener, move |listener| async move {
                let conn = listener.accept().await;
                Some(((conn, listener_id), listener))
            }))
        },
    ));

    // Loop over all incoming connections.  For each one, call
    // handle_socks_conn() in a new task.
    while let Some((conn, listener_id)) = incoming.next().await {
        let (stream, peer) = match conn {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Failed to accept on SOCKS listener {}: {}", listener_id, e);
                continue;
            }
        };
        debug!("New connection from {} on listener {}", peer, listener_id);

        let runtime_copy = runtime.clone();
        let outbound_ref = Arc::clone(&outbound);
        runtime
            .spawn(async move {
                match handle_socks_conn(&runtime_copy, &*outbound_ref, stream).await {
                    Ok(()) => debug!("Connection from {} closed", peer),
                    Err(e) => warn!("Connection from {} exited with error: {}", peer, e),
                }
            })
            .context("Unable to spawn SOCKS session")?;
    }

    Ok(())
}

/// Launch a SOCKS proxy on every address in `listen`, relaying connections
/// through `outbound`.
///
/// Runs until the runtime refuses to spawn a task.  Fails immediately if
/// none of the addresses can be bound.
pub async fn run_socks_proxy<R, O>(runtime: R, outbound: Arc<O>, listen: &[SocketAddr]) -> Result<()>
where
    R: Runtime,
    O: Outbound + 'static,
{
    let listeners = bind_listeners(&runtime, listen).await?;
    serve(runtime, outbound, listeners).await
}
