//! Detect a "ctrl-c" notification or other reason to exit.

use anyhow::{Context, Result};

/// Wait until a control-c notification is received.
///
/// See the documentation for `tokio::signal::ctrl_c` for caveats: once
/// this has been called, the default ctrl-c behavior is gone for the
/// rest of the process.
pub(crate) async fn wait_for_ctrl_c() -> Result<()> {
    tokio_crate::signal::ctrl_c()
        .await
        .context("Unable to listen for ctrl-c")?;
    Ok(())
}
