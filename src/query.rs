use log::{debug, error, warn};

use crate::config::QueryConfig;
use crate::error::{ParseError, SourceQueryError};
use crate::info::ServerInfo;
use crate::packet::{PacketType, RequestPacket, ResponsePacket};
use crate::players::{self, PlayerRecord};
use crate::rules::{self, RulesMap};
use crate::transport::{Transport, UdpTransport};

/// A2S_INFO, A2S_PLAYER and A2S_RULES queries over a [Transport].
///
/// Holds no state between calls. The `try_*` methods return the error; the
/// plain ones log it and return `None` so a caller can keep its last snapshot.
#[derive(Debug, Clone, Default)]
pub struct A2sClient<T = UdpTransport> {
    transport: T,
}

impl A2sClient<UdpTransport> {
    pub fn new(config: QueryConfig) -> Self {
        Self::with_transport(UdpTransport::new(config))
    }
}

impl<T: Transport> A2sClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    async fn send_recv(
        &self,
        request: &RequestPacket,
        host: &str,
        port: u16,
    ) -> Result<ResponsePacket, SourceQueryError> {
        let raw = self.transport.exchange(&request.pack(), host, port).await?;
        Ok(ResponsePacket::unpack(&raw)?)
    }

    /// Send `request`, answering at most one challenge.
    async fn request(
        &self,
        request: RequestPacket,
        host: &str,
        port: u16,
    ) -> Result<ResponsePacket, SourceQueryError> {
        let packet = self.send_recv(&request, host, port).await?;

        // absolving challenge
        let Some(token) = packet.challenge() else {
            return Ok(packet);
        };
        debug!("[{}:{}] challenged with {:?}", host, port, token);
        let packet = self.send_recv(&request.with_challenge(token), host, port).await?;
        if packet.packet_type() == PacketType::Challenge {
            return Err(ParseError::UnexpectedChallenge.into());
        }

        Ok(packet)
    }

    pub async fn try_info(&self, host: &str, port: u16) -> Result<ServerInfo, SourceQueryError> {
        let packet = self.request(RequestPacket::info(None), host, port).await?;
        Ok(ServerInfo::parse(&packet)?)
    }

    pub async fn try_players(
        &self,
        host: &str,
        port: u16,
    ) -> Result<Vec<PlayerRecord>, SourceQueryError> {
        let packet = self.request(RequestPacket::players(None), host, port).await?;
        Ok(players::parse(&packet)?)
    }

    pub async fn try_rules(&self, host: &str, port: u16) -> Result<RulesMap, SourceQueryError> {
        let packet = self.request(RequestPacket::rules(None), host, port).await?;
        Ok(rules::parse(&packet)?)
    }

    /// Server information, or `None` if the server could not be queried.
    pub async fn info(&self, host: &str, port: u16) -> Option<ServerInfo> {
        no_data(host, port, "info", self.try_info(host, port).await)
    }

    /// Connected players, or `None` if the server could not be queried.
    pub async fn players(&self, host: &str, port: u16) -> Option<Vec<PlayerRecord>> {
        no_data(host, port, "players", self.try_players(host, port).await)
    }

    /// Server rules, or `None` if the server could not be queried.
    pub async fn rules(&self, host: &str, port: u16) -> Option<RulesMap> {
        no_data(host, port, "rules", self.try_rules(host, port).await)
    }
}

fn no_data<V>(host: &str, port: u16, what: &str, result: Result<V, SourceQueryError>) -> Option<V> {
    match result {
        Ok(value) => Some(value),
        Err(e @ SourceQueryError::TransportTimeout { .. }) => {
            warn!("[{}:{}] {} query: {}", host, port, what, e);
            None
        }
        Err(e) => {
            error!("[{}:{}] error while querying {}: {}", host, port, what, e);
            None
        }
    }
}

/// Query `host:port` with A2S_INFO using the default 2 second timeout and 1 retry.
///
/// Example usage:
/// ```no_run
/// # async fn run() {
/// if let Some(info) = rsourcectl::query::query_info("127.0.0.1", 26900).await {
///     println!("{} on {}", info.name, info.map);
/// }
/// # }
/// ```
pub async fn query_info(host: &str, port: u16) -> Option<ServerInfo> {
    A2sClient::new(QueryConfig::default()).info(host, port).await
}

/// Query `host:port` with A2S_PLAYER using the default budget.
pub async fn query_players(host: &str, port: u16) -> Option<Vec<PlayerRecord>> {
    A2sClient::new(QueryConfig::default()).players(host, port).await
}

/// Query `host:port` with A2S_RULES using the default budget.
pub async fn query_rules(host: &str, port: u16) -> Option<RulesMap> {
    A2sClient::new(QueryConfig::default()).rules(host, port).await
}
