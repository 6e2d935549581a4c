//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated
//! configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use hilo::RoomConfig;

/// Complete server configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Server bind address.
    pub bind: SocketAddr,
    /// Directory the browser client is served from.
    pub static_dir: PathBuf,
    /// Bind address for the Prometheus scrape endpoint, if enabled.
    pub metrics_bind: Option<SocketAddr>,
    /// Limits applied to every room.
    pub room: RoomConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables. CLI overrides win
    /// over the environment, which wins over the defaults.
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        static_dir_override: Option<PathBuf>,
        metrics_bind_override: Option<SocketAddr>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => match std::env::var("SERVER_BIND") {
                Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("'{raw}' is not a valid socket address"),
                })?,
                Err(_) => SocketAddr::from(([127, 0, 0, 1], 8000)),
            },
        };

        let static_dir = static_dir_override
            .or_else(|| std::env::var("STATIC_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("public"));

        let metrics_bind = match metrics_bind_override {
            Some(addr) => Some(addr),
            None => match std::env::var("METRICS_BIND") {
                Ok(raw) => Some(raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "METRICS_BIND".to_string(),
                    reason: format!("'{raw}' is not a valid socket address"),
                })?),
                Err(_) => None,
            },
        };

        let room = RoomConfig {
            min_players: parse_env_or("ROOM_MIN_PLAYERS", RoomConfig::default().min_players),
            max_players: parse_env_or("ROOM_MAX_PLAYERS", RoomConfig::default().max_players),
        };

        Ok(ServerConfig {
            bind,
            static_dir,
            metrics_bind,
            room,
        })
    }

    /// Validate configuration after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.room.validate().map_err(|reason| ConfigError::Invalid {
            var: "ROOM_MIN_PLAYERS/ROOM_MAX_PLAYERS".to_string(),
            reason,
        })?;

        if let Some(metrics_bind) = self.metrics_bind
            && metrics_bind == self.bind
        {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: "must differ from SERVER_BIND".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback.
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
