//! Structures that represent SOCKS messages

use crate::{Error, Result};

use caret::caret_int;
use std::fmt;
use std::net::IpAddr;

/// A completed SOCKS request, as negotiated on a SOCKS connection.
///
/// Once this request is done, we know where to connect.  The only
/// command we accept is CONNECT, so the request holds nothing but the
/// destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SocksRequest {
    /// The target address.
    addr: SocksAddr,
    /// The target port.
    port: u16,
}

/// An address sent or received as part of a SOCKS handshake
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::exhaustive_enums)]
pub enum SocksAddr {
    /// A DNS hostname, exactly as the client sent it.
    ///
    /// We never resolve it here: that's up to whoever dials the
    /// destination.
    Hostname(String),
    /// An IP address.
    Ip(IpAddr),
}

caret_int! {
    /// An authentication method offered by a SOCKS5 client.
    pub struct AuthMethod(u8) {
        /// RFC 1928: "NO AUTHENTICATION REQUIRED"
        NO_AUTH = 0x00,
        /// RFC 1928: "GSSAPI". Not supported.
        GSSAPI = 0x01,
        /// RFC 1929 username/password. Not supported.
        USERNAME_PASSWORD = 0x02,
        /// RFC 1928: "NO ACCEPTABLE METHODS"
        NO_ACCEPTABLE = 0xFF,
    }
}

caret_int! {
    /// Command from the socks client telling us what to do.
    pub struct SocksCmd(u8) {
        /// Connect to a remote TCP address:port.
        CONNECT = 1,
        /// Not supported.
        BIND = 2,
        /// Not supported.
        UDP_ASSOCIATE = 3,
    }
}

caret_int! {
    /// The encoding used for a destination address in a SOCKS5 request.
    pub struct AddrType(u8) {
        /// Four bytes of IPv4 address.
        IPV4 = 0x01,
        /// A length byte, followed by that many bytes of hostname.
        HOSTNAME = 0x03,
        /// Sixteen bytes of IPv6 address.
        IPV6 = 0x04,
    }
}

caret_int! {
    /// Possible reply status values from a SOCKS5 handshake.
    ///
    /// Note that the documentation for these values is kind of scant,
    /// and is limited to what the RFC says.
    pub struct SocksStatus(u8) {
        /// RFC 1928: "succeeded"
        SUCCEEDED = 0x00,
        /// RFC 1928: "general SOCKS server failure"
        GENERAL_FAILURE = 0x01,
        /// RFC 1928: "connection not allowable by ruleset"
        NOT_ALLOWED = 0x02,
        /// RFC 1928: "Network unreachable"
        NETWORK_UNREACHABLE = 0x03,
        /// RFC 1928: "Host unreachable"
        HOST_UNREACHABLE = 0x04,
        /// RFC 1928: "Connection refused"
        CONNECTION_REFUSED = 0x05,
        /// RFC 1928: "TTL expired"
        TTL_EXPIRED = 0x06,
        /// RFC 1928: "Command not supported"
        COMMAND_NOT_SUPPORTED = 0x07,
        /// RFC 1928: "Address type not supported"
        ADDRTYPE_NOT_SUPPORTED = 0x08,
    }
}

impl SocksRequest {
    /// Create a SocksRequest for a given destination.
    ///
    /// Return an error if `addr` is an empty hostname.
    pub fn new(addr: SocksAddr, port: u16) -> Result<Self> {
        if let SocksAddr::Hostname(h) = &addr {
            if h.is_empty() {
                return Err(Error::BadHostname);
            }
        }
        Ok(SocksRequest { addr, port })
    }

    /// Return the requested address.
    pub fn addr(&self) -> &SocksAddr {
        &self.addr
    }

    /// Return the requested port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Return the destination as a `host:port` string, suitable for
    /// handing to a connector.
    ///
    /// IPv6 addresses are put in brackets, so that the result parses as
    /// a socket address.
    pub fn address(&self) -> String {
        match &self.addr {
            SocksAddr::Ip(IpAddr::V6(ip)) => format!("[{}]:{}", ip, self.port),
            other => format!("{}:{}", other, self.port),
        }
    }
}

impl fmt::Display for SocksAddr {
    /// Format a string (a hostname or IP address) corresponding to this
    /// SocksAddr.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocksAddr::Ip(a) => write!(f, "{}", a),
            SocksAddr::Hostname(h) => write!(f, "{}", h),
        }
    }
}

impl fmt::Display for SocksRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address())
    }
}
