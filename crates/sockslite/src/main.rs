//! A minimal SOCKS5 proxy: accept SOCKS connections and relay each one
//! straight to its destination.

#![warn(missing_docs)]

mod exit;

use std::sync::Arc;

use futures::future::FutureExt;
use sockslite::cfg;
use sockslite_outbound::Direct;

use anyhow::{Context, Result};
use argh::FromArgs;
use tracing::{info, Level};

#[derive(FromArgs, Debug, Clone)]
/// Open one or more SOCKS5 ports, and relay every CONNECT request to its
/// destination.
struct Args {
    /// override the default location(s) for the configuration file
    #[argh(option, short = 'f')]
    rc: Vec<String>,
    /// override a configuration option (uses toml syntax)
    #[argh(option, short = 'c')]
    cfg: Vec<String>,
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    let dflt_config = cfg::default_config_file();

    let config = cfg::load_config(dflt_config, &args.rc, &args.cfg)
        .context("Unable to load configuration")?;

    let level = if config.trace() {
        Level::TRACE
    } else {
        Level::DEBUG
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let runtime = sockslite_rtcompat::tokio::create_runtime()
        .context("Unable to create a tokio runtime")?;
    let handle = runtime.handle();
    runtime.block_on(async {
        let outbound = Arc::new(Direct::with_timeout(
            handle.clone(),
            config.connect_timeout(),
        ));
        let proxy =
            sockslite::proxy::run_socks_proxy(handle, outbound, config.listen_addrs()).fuse();
        let ctrl_c = exit::wait_for_ctrl_c().fuse();
        futures::pin_mut!(proxy, ctrl_c);

        futures::select!(
            r = ctrl_c => r.map(|()| info!("Received ctrl-c; exiting.")),
            r = proxy => r,
        )
    })
}
