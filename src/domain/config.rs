use crate::domain::error::{HarnessError, HarnessResult};
use serde::{Deserialize, Serialize};

/// Largest write size the bench accepts, 64 MiB
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Harness configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Line relay client settings
    #[serde(default)]
    pub relay: RelayConfig,
    /// TCP echo server settings
    #[serde(default)]
    pub echo: ListenerConfig,
    /// HTTP stub server settings
    #[serde(default)]
    pub http: ListenerConfig,
    /// Throughput bench settings
    #[serde(default)]
    pub bench: BenchConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Relay client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Host the relay and bench clients dial
    #[serde(default = "default_relay_host")]
    pub host: String,
}

/// Listener settings shared by the echo and HTTP servers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// Bind address, `host:port`
    #[serde(default = "default_bind")]
    pub bind: String,
}

/// Throughput bench settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Size of each write in bytes
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Stop after this many mebibytes
    #[serde(default = "default_limit_mb")]
    pub limit_mb: u64,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_relay_host() -> String {
    "127.0.0.1".to_string()
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_chunk_size() -> usize {
    64 * 1024
}

fn default_limit_mb() -> u64 {
    500
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: default_relay_host(),
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            limit_mb: default_limit_mb(),
        }
    }
}

impl BenchConfig {
    /// Byte limit, or `InvalidInput` when `limit_mb` does not fit in a `u64` of bytes
    pub fn limit_bytes(&self) -> HarnessResult<u64> {
        self.limit_mb.checked_mul(1024 * 1024).ok_or_else(|| {
            HarnessError::InvalidInput(format!("limit of {} MB is too large", self.limit_mb))
        })
    }

    /// Check chunk size and limit before any connection is made
    pub fn validate(&self) -> HarnessResult<u64> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(HarnessError::InvalidInput(format!(
                "chunk size must be between 1 and {} bytes, got {}",
                MAX_CHUNK_SIZE, self.chunk_size
            )));
        }
        self.limit_bytes()
    }
}
