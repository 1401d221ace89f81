//! Configuration for the `sockslite` binary.
//!
//! Configuration is handled using the `serde` and `config` crates.  It
//! comes from three layers, each overriding the last: the built-in
//! defaults, then one or more TOML files, then individual TOML lines given
//! on the command line.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default options to use for our configuration.
pub const DEFAULTS: &str = include_str!("./sockslite_defaults.toml");

/// Structure to hold our configuration options, whether from a
/// configuration file or the command line.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct SocksliteConfig {
    /// Where to accept SOCKS connections.
    proxy: ProxyConfig,
    /// How to reach destinations.
    outbound: OutboundConfig,
    /// What to log.
    logging: LoggingConfig,
}

/// Configuration for the SOCKS listeners.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ProxyConfig {
    /// Addresses to listen on for incoming SOCKS connections.
    listen: Vec<SocketAddr>,
}

/// Configuration for outgoing connections.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct OutboundConfig {
    /// How many seconds to spend resolving and connecting to a
    /// destination before giving up.
    connect_timeout_secs: u64,
}

/// Configuration for logging.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Whether to log at trace level.
    trace: bool,
}

impl SocksliteConfig {
    /// Return the addresses we should listen on.
    pub fn listen_addrs(&self) -> &[SocketAddr] {
        &self.proxy.listen
    }

    /// Return the time limit for each outbound connection attempt.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.outbound.connect_timeout_secs)
    }

    /// Return true if we should log at trace level.
    pub fn trace(&self) -> bool {
        self.logging.trace
    }
}

/// Return a filename for the default user configuration file.
pub fn default_config_file() -> Option<PathBuf> {
    let pd = directories::ProjectDirs::from("org", "sockslite", "sockslite")?;

    Some(pd.config_dir().join("sockslite.toml"))
}

/// Load a configuration from the built-in defaults, the TOML files in
/// `files`, and the TOML lines in `overrides`.
///
/// If `files` is empty, we use the file at `default_path` instead, if
/// there is one and it exists.
pub fn load_config<P1, P2, S>(
    default_path: Option<P1>,
    files: &[P2],
    overrides: &[S],
) -> Result<SocksliteConfig, config::ConfigError>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
    S: AsRef<str>,
{
    let mut cfg = config::Config::new();
    cfg.merge(config::File::from_str(DEFAULTS, config::FileFormat::Toml))?;

    let mut search_path: Vec<&Path> = Vec::new();
    for f in files {
        search_path.push(f.as_ref());
    }
    let mut missing_ok = false;
    if search_path.is_empty() {
        if let Some(f) = &default_path {
            search_path.push(f.as_ref());
            missing_ok = true;
        }
    }

    for p in search_path {
        let f: config::File<_> = p.into();
        cfg.merge(f.format(config::FileFormat::Toml).required(!missing_ok))?;
    }

    // Each override is a complete line of TOML, like `proxy.listen = [...]`.
    for line in overrides {
        cfg.merge(config::File::from_str(line.as_ref(), config::FileFormat::Toml))?;
    }

    cfg.try_into()
}
