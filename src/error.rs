use std::str::Utf8Error;

use thiserror::Error;

/// Everything that can go wrong talking to a server.
#[derive(Debug, Error)]
pub enum SourceQueryError {
    /// No UDP reply arrived after every attempt was spent.
    #[error("could not read a UDP response from server {addr}")]
    TransportTimeout { addr: String },
    /// The reply did not match the expected layout.
    #[error("malformed response: {0}")]
    ProtocolParse(#[from] ParseError),
    /// Connecting, writing or reading a socket failed.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("packet truncated at offset {0}")]
    Truncated(usize),
    #[error("string is not valid utf-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),
    #[error("unknown packet header {0}")]
    UnknownPacketHeader(i32),
    #[error("unknown packet type {0:#04x}")]
    UnknownPacketType(u8),
    #[error("expected packet type {expected:#04x}, got {got:#04x}")]
    WrongPacketType { expected: u8, got: u8 },
    #[error("server sent a challenge in reply to a challenged request")]
    UnexpectedChallenge,
    #[error("split packets are not supported")]
    SplitPacket,
    #[error("rules payload holds an odd number of strings ({0})")]
    OddRuleCount(usize),
    #[error("could not format duration: {0}")]
    Format(#[from] time::error::Format),
}
