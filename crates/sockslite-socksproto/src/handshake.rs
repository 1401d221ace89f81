//! The two sub-protocols of a SOCKS5 handshake, plus reply encoding.
//!
//! Each step reads exactly the bytes it needs with `read_exact`, so a
//! client that disconnects partway through gives an [`Error::Io`].

use crate::msg::{AddrType, AuthMethod, SocksAddr, SocksCmd, SocksRequest, SocksStatus};
use crate::{Error, Result, SOCKS5_VERSION};

use futures::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Length of every reply that [`encode_reply`] produces.
const REPLY_LEN: usize = 10;

/// Choose an authentication method from the ones a client offered.
///
/// We only do "no authentication"; anything else gets
/// [`AuthMethod::NO_ACCEPTABLE`].
pub fn select_method(methods: &[u8]) -> AuthMethod {
    if methods.contains(&AuthMethod::NO_AUTH.into()) {
        AuthMethod::NO_AUTH
    } else {
        AuthMethod::NO_ACCEPTABLE
    }
}

/// Run the method-negotiation step of a SOCKS5 handshake on `stream`.
///
/// On success, the client has been told that we picked "no
/// authentication", and the next thing it sends should be a request.
///
/// A client with the wrong version byte gets no answer at all.  A client
/// that doesn't offer "no authentication" is told that no method is
/// acceptable, and we return [`Error::NoAcceptableAuth`].
pub async fn negotiate<S>(stream: &mut S) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    let mut header = [0_u8; 2];
    stream
        .read_exact(&mut header)
        .await
        .map_err(Error::io("reading SOCKS greeting"))?;
    let [version, n_methods] = header;
    if version != SOCKS5_VERSION {
        return Err(Error::BadProtocol(version));
    }

    let mut methods = vec![0_u8; usize::from(n_methods)];
    stream
        .read_exact(&mut methods[..])
        .await
        .map_err(Error::io("reading authentication methods"))?;

    let method = select_method(&methods[..]);
    let reply = [SOCKS5_VERSION, method.into()];
    if method == AuthMethod::NO_ACCEPTABLE {
        // The rejection is all the client would learn; a failure to
        // deliver it doesn't change the outcome.
        let _ignore = write_and_flush(stream, &reply[..], "rejecting authentication").await;
        return Err(Error::NoAcceptableAuth);
    }

    write_and_flush(stream, &reply[..], "accepting authentication").await
}

/// Read and decode a SOCKS5 request from `stream`.
///
/// This must run after a successful [`negotiate`].  No reply is sent
/// for a request that decodes successfully: the caller must send exactly
/// one with [`send_reply`] once it knows how the connection went.
///
/// Requests we refuse get their reply here, before the error is
/// returned.  An unsupported command is refused without reading the
/// rest of the request.
pub async fn read_request<S>(stream: &mut S) -> Result<SocksRequest>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    let mut header = [0_u8; 4];
    stream
        .read_exact(&mut header)
        .await
        .map_err(Error::io("reading SOCKS request"))?;
    let [version, cmd, _reserved, atype] = header;
    if version != SOCKS5_VERSION {
        return Err(Error::BadProtocol(version));
    }

    let cmd = SocksCmd::from(cmd);
    if cmd != SocksCmd::CONNECT {
        let _ignore = send_reply(stream, SocksStatus::COMMAND_NOT_SUPPORTED).await;
        return Err(Error::UnsupportedCommand(cmd));
    }

    let atype = AddrType::from(atype);
    let addr = match atype {
        AddrType::IPV4 => {
            let mut octets = [0_u8; 4];
            stream
                .read_exact(&mut octets)
                .await
                .map_err(Error::io("reading IPv4 address"))?;
            SocksAddr::Ip(Ipv4Addr::from(octets).into())
        }
        AddrType::HOSTNAME => {
            let mut len = [0_u8; 1];
            stream
                .read_exact(&mut len)
                .await
                .map_err(Error::io("reading hostname length"))?;
            let mut hostname = vec![0_u8; usize::from(len[0])];
            stream
                .read_exact(&mut hostname[..])
                .await
                .map_err(Error::io("reading hostname"))?;
            // A name that isn't text can't resolve to anything, so the
            // client hears what it would have heard from a failed dial.
            let status = match String::from_utf8(hostname) {
                Ok(h) if !h.is_empty() => Ok(SocksAddr::Hostname(h)),
                Ok(_) => Err(SocksStatus::GENERAL_FAILURE),
                Err(_) => Err(SocksStatus::HOST_UNREACHABLE),
            };
            match status {
                Ok(addr) => addr,
                Err(status) => {
                    let _ignore = send_reply(stream, status).await;
                    return Err(Error::BadHostname);
                }
            }
        }
        AddrType::IPV6 => {
            let mut octets = [0_u8; 16];
            stream
                .read_exact(&mut octets)
                .await
                .map_err(Error::io("reading IPv6 address"))?;
            SocksAddr::Ip(Ipv6Addr::from(octets).into())
        }
        _ => {
            let _ignore = send_reply(stream, SocksStatus::ADDRTYPE_NOT_SUPPORTED).await;
            return Err(Error::UnsupportedAddrType(atype));
        }
    };

    let mut port = [0_u8; 2];
    stream
        .read_exact(&mut port)
        .await
        .map_err(Error::io("reading port"))?;

    SocksRequest::new(addr, u16::from_be_bytes(port))
}

/// Format a SOCKS5 reply with a given status.
///
/// The bound address is always 0.0.0.0:0.  RFC 1928 lets a server say
/// which local address it used for the outgoing connection, but it is
/// advisory for CONNECT and clients don't rely on it.
pub fn encode_reply(status: SocksStatus) -> [u8; REPLY_LEN] {
    let mut reply = [0_u8; REPLY_LEN];
    reply[0] = SOCKS5_VERSION;
    reply[1] = status.into();
    // reply[2] is reserved.
    reply[3] = AddrType::IPV4.into();
    reply
}

/// Send a SOCKS5 reply with `status` to the client.
pub async fn send_reply<S>(stream: &mut S, status: SocksStatus) -> Result<()>
where
    S: AsyncWrite + Unpin + ?Sized,
{
    write_and_flush(stream, &encode_reply(status)[..], "writing SOCKS reply").await
}

/// Write all of `msg` to `stream` and flush it.
async fn write_and_flush<S>(stream: &mut S, msg: &[u8], action: &'static str) -> Result<()>
where
    S: AsyncWrite + Unpin + ?Sized,
{
    stream.write_all(msg).await.map_err(Error::io(action))?;
    stream.flush().await.map_err(Error::io(action))
}
