use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use log::debug;
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::timeout;

use crate::config::QueryConfig;
use crate::error::SourceQueryError;

/// Largest payload a UDP datagram can carry.
const MAX_DATAGRAM: usize = 65_535;
/// Pause before listening again after an ICMP error was reported.
const UNREACHABLE_BACKOFF: Duration = Duration::from_millis(10);

/// A request/reply exchange with an A2S server.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Send `request` to `host:port` and return the reply datagram.
    async fn exchange(&self, request: &[u8], host: &str, port: u16)
        -> Result<Vec<u8>, SourceQueryError>;
}

/// [Transport] over a fresh UDP socket per attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpTransport {
    config: QueryConfig,
}

impl UdpTransport {
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }
}

impl Transport for UdpTransport {
    async fn exchange(
        &self,
        request: &[u8],
        host: &str,
        port: u16,
    ) -> Result<Vec<u8>, SourceQueryError> {
        exchange(request, host, port, self.config.timeout, self.config.max_retries).await
    }
}

/// Send `request` to `host:port` and wait up to `timeout_dur` for a reply,
/// trying `max_retries` more times if none arrives.
///
/// Each attempt binds its own socket, which is closed before the next attempt
/// starts. Blocks for at most `(max_retries + 1) * timeout_dur`.
/// Datagrams from other peers and ICMP errors for a closed port count as
/// silence, which is retried. Other socket errors are returned straight away.
pub async fn exchange(
    request: &[u8],
    host: &str,
    port: u16,
    timeout_dur: Duration,
    max_retries: u32,
) -> Result<Vec<u8>, SourceQueryError> {
    let attempts = max_retries.saturating_add(1);

    for attempt in 1..=attempts {
        debug!("[{}:{}] sending {} bytes, attempt {}/{}", host, port, request.len(), attempt, attempts);
        match timeout(timeout_dur, send_recv(request, host, port)).await {
            Ok(reply) => return reply,
            Err(_) => debug!("[{}:{}] no reply within {:?}", host, port, timeout_dur),
        }
    }

    Err(SourceQueryError::TransportTimeout {
        addr: format!("{}:{}", host, port),
    })
}

fn is_unreachable(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset
    )
}

async fn send_recv(request: &[u8], host: &str, port: u16) -> Result<Vec<u8>, SourceQueryError> {
    let remote: SocketAddr = lookup_host((host, port)).await?.next().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{} did not resolve to an address", host),
        )
    })?;

    // just arbitrarily bind any port of the same family
    let local: SocketAddr = if remote.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let sock: UdpSocket = UdpSocket::bind(local).await?;
    sock.send_to(request, remote).await?;

    let mut resp_buf = vec![0u8; MAX_DATAGRAM];
    loop {
        match sock.recv_from(&mut resp_buf).await {
            Ok((len, from)) if from == remote => {
                resp_buf.truncate(len);
                break;
            }
            Ok((_, from)) => debug!("[{}:{}] ignoring datagram from {}", host, port, from),
            // a closed port is silence, left to the caller's timeout
            Err(e) if is_unreachable(&e) => {
                debug!("[{}:{}] {}", host, port, e);
                tokio::time::sleep(UNREACHABLE_BACKOFF).await;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(resp_buf)
}
