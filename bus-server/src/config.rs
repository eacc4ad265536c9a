//! Server configuration.
//!
//! Read from the environment (after loading `.env`, if present).

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Default listen port, shared with the frontend's API base URL.
pub const DEFAULT_PORT: u16 = 7000;

/// Default bcrypt cost factor.
pub const DEFAULT_HASH_COST: u32 = 10;

/// Error from reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set to something unparseable
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },

    /// The bcrypt cost is outside 4..=31
    #[error("hash cost {0} out of range (4..=31)")]
    HashCostOutOfRange(u32),
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,

    /// Port to bind.
    pub port: u16,

    /// JSON snapshot backing the store. `None` keeps data in memory only.
    pub data_file: Option<PathBuf>,

    /// Directory served under `/static`.
    pub static_dir: PathBuf,

    /// bcrypt cost factor for new passwords.
    pub hash_cost: u32,
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    ///
    /// | Variable         | Default     |
    /// |------------------|-------------|
    /// | `BUS_HOST`       | `127.0.0.1` |
    /// | `PORT`           | `7000`      |
    /// | `BUS_DATA_FILE`  | unset       |
    /// | `BUS_STATIC_DIR` | `static`    |
    /// | `BUS_HASH_COST`  | `10`        |
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env is normal.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let set = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let host = set("BUS_HOST").unwrap_or(defaults.host);

        let port = match set("PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value,
            })?,
            None => defaults.port,
        };

        let data_file = set("BUS_DATA_FILE").map(PathBuf::from);

        let static_dir = set("BUS_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let hash_cost = match set("BUS_HASH_COST") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "BUS_HASH_COST",
                value,
            })?,
            None => defaults.hash_cost,
        };
        if !(4..=31).contains(&hash_cost) {
            return Err(ConfigError::HashCostOutOfRange(hash_cost));
        }

        Ok(Self {
            host,
            port,
            data_file,
            static_dir,
            hash_cost,
        })
    }

    /// The socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|_| ConfigError::Invalid {
            var: "BUS_HOST",
            value: self.host.clone(),
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            data_file: None,
            static_dir: PathBuf::from("static"),
            hash_cost: DEFAULT_HASH_COST,
        }
    }
}
