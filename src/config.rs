use std::env;
use std::time::Duration;

/// Default A2S query port of a 7 Days to Die server.
pub const DEFAULT_QUERY_PORT: u16 = 26900;
/// Default telnet console port.
pub const DEFAULT_CONSOLE_PORT: u16 = 8081;

fn env_millis(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
}

/// Timeout and retry budget for A2S queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// How long to wait for each reply.
    pub timeout: Duration,
    /// Extra attempts after the first one times out.
    pub max_retries: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            max_retries: 1,
        }
    }
}

impl QueryConfig {
    /// Defaults, overridden by `A2S_TIMEOUT_MS` and `A2S_RETRIES` when they parse.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            timeout: env_millis("A2S_TIMEOUT_MS").unwrap_or(defaults.timeout),
            max_retries: env::var("A2S_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_retries),
        }
    }
}

/// Time limits for one remote console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub connect_timeout: Duration,
    /// Overall limit on reading the reply, measured from the first read.
    pub read_timeout: Duration,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
        }
    }
}

impl ConsoleConfig {
    /// Defaults, overridden by `CONSOLE_CONNECT_TIMEOUT_MS` and `CONSOLE_READ_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            connect_timeout: env_millis("CONSOLE_CONNECT_TIMEOUT_MS")
                .unwrap_or(defaults.connect_timeout),
            read_timeout: env_millis("CONSOLE_READ_TIMEOUT_MS").unwrap_or(defaults.read_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults() {
        let config = QueryConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.max_retries, 1);
    }

    // env vars are process-wide, so every variable is only touched by this one test
    #[test]
    fn reads_environment() {
        env::set_var("A2S_TIMEOUT_MS", "250");
        env::set_var("A2S_RETRIES", "not a number");
        env::set_var("CONSOLE_READ_TIMEOUT_MS", "1500");
        let query = QueryConfig::from_env();
        let console = ConsoleConfig::from_env();
        env::remove_var("A2S_TIMEOUT_MS");
        env::remove_var("A2S_RETRIES");
        env::remove_var("CONSOLE_READ_TIMEOUT_MS");

        assert_eq!(query.timeout, Duration::from_millis(250));
        assert_eq!(query.max_retries, 1);
        assert_eq!(console.read_timeout, Duration::from_millis(1500));
        assert_eq!(console.connect_timeout, Duration::from_secs(5));
    }
}
