//! Server configuration.
//!
//! The defaults of [`Limits`] are part of the external contract and should
//! only be overridden for testing or unusual deployments.

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

/// Number of updates kept in history
pub const HISTORY_LIMIT: usize = 20;
/// Interval after which an idle connection receives a single-space ping
pub const PING_RATE: Duration = Duration::from_secs(1);
/// Maximum accepted message length, in bytes, before escaping
pub const MAX_MSG_LEN: usize = 1024;
/// Number of buffered chunks per connection
pub const BUFFER_SIZE: usize = 5;

/// Invalid configuration values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("history limit must be greater than zero")]
    ZeroHistoryLimit,

    #[error("ping rate must be greater than zero")]
    ZeroPingRate,

    #[error("maximum message length must be greater than zero")]
    ZeroMaxMessageLength,

    #[error("per-connection buffer size must be greater than zero")]
    ZeroBufferSize,
}

/// Tunables of the broadcast engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub history_limit: usize,
    pub ping_rate: Duration,
    pub max_msg_len: usize,
    pub buffer_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            history_limit: HISTORY_LIMIT,
            ping_rate: PING_RATE,
            max_msg_len: MAX_MSG_LEN,
            buffer_size: BUFFER_SIZE,
        }
    }
}

impl Limits {
    /// Reject values that would make the engine unusable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == 0 {
            return Err(ConfigError::ZeroHistoryLimit);
        }
        if self.ping_rate.is_zero() {
            return Err(ConfigError::ZeroPingRate);
        }
        if self.max_msg_len == 0 {
            return Err(ConfigError::ZeroMaxMessageLength);
        }
        if self.buffer_size == 0 {
            return Err(ConfigError::ZeroBufferSize);
        }
        Ok(())
    }
}

/// Everything needed to run the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to (e.g., "127.0.0.1")
    pub host: String,
    /// Port number to bind to (e.g., 8080)
    pub port: u16,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    pub limits: Limits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            static_dir: PathBuf::from("static"),
            limits: Limits::default(),
        }
    }
}

impl ServerConfig {
    /// `host:port` as passed to the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_match_contract_constants() {
        // テスト項目: デフォルト値が外部仕様の定数と一致する
        // given (前提条件):

        // when (操作):
        let limits = Limits::default();

        // then (期待する結果):
        assert_eq!(limits.history_limit, 20);
        assert_eq!(limits.ping_rate, Duration::from_secs(1));
        assert_eq!(limits.max_msg_len, 1024);
        assert_eq!(limits.buffer_size, 5);
        assert_eq!(limits.validate(), Ok(()));
    }

    #[test]
    fn test_zero_values_are_rejected() {
        // テスト項目: 0 を含む設定はそれぞれ対応するエラーで拒否される
        let cases = [
            (
                Limits { history_limit: 0, ..Limits::default() },
                ConfigError::ZeroHistoryLimit,
            ),
            (
                Limits { ping_rate: Duration::ZERO, ..Limits::default() },
                ConfigError::ZeroPingRate,
            ),
            (
                Limits { max_msg_len: 0, ..Limits::default() },
                ConfigError::ZeroMaxMessageLength,
            ),
            (
                Limits { buffer_size: 0, ..Limits::default() },
                ConfigError::ZeroBufferSize,
            ),
        ];

        for (limits, expected) in cases {
            assert_eq!(limits.validate(), Err(expected));
        }
    }

    #[test]
    fn test_bind_addr() {
        // テスト項目: host と port から bind アドレスが組み立てられる
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            ..ServerConfig::default()
        };

        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }
}
