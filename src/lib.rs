//! Pure Rust async clients for querying and controlling a game server:
//! the [Source A2S query protocol](https://developer.valvesoftware.com/wiki/Server_queries)
//! (info, players, rules) over UDP and a 7 Days to Die style telnet console over TCP.
pub mod config;
pub mod console;
pub mod error;
pub mod framer;
pub mod info;
pub mod packet;
mod parse;
pub mod players;
pub mod query;
pub mod rules;
pub mod transport;

pub use config::{ConsoleConfig, QueryConfig};
pub use console::ConsoleClient;
pub use error::{ParseError, SourceQueryError};
pub use info::{OperatingSystem, ServerInfo, ServerType};
pub use players::PlayerRecord;
pub use query::A2sClient;
pub use rules::RulesMap;
