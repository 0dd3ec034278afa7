//! Configuration for tableside components

use crate::common::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the TOML config file
pub const CONFIG_ENV: &str = "TABLESIDE_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "tableside.toml";

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Coordinator-specific config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinator: Option<CoordinatorConfig>,

    /// Availability-store-specific config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<AvailabilityConfig>,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            coordinator: None,
            availability: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load from the file named by `TABLESIDE_CONFIG` (or `tableside.toml`) overlaid with
    /// `TABLESIDE__SECTION__KEY` environment variables. Falls back to defaults on error.
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring configuration from {}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Load from an explicit path. A missing file is not an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("TABLESIDE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn coordinator_or_default(&self) -> CoordinatorConfig {
        self.coordinator.clone().unwrap_or_default()
    }

    pub fn availability_or_default(&self) -> AvailabilityConfig {
        self.availability.clone().unwrap_or_default()
    }
}

/// Reservation coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Bind address for HTTP API
    #[serde(default = "default_coord_bind")]
    pub bind_addr: SocketAddr,

    /// Base URL of the availability store
    #[serde(default = "default_availability_url")]
    pub availability_url: String,

    /// Upper bound on every availability store call
    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_ms: u64,

    /// Load the initial waitlist on startup
    #[serde(default = "default_true")]
    pub seed_waitlists: bool,

    /// Request body limit for the public API
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_coord_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3001))
}
fn default_availability_url() -> String {
    "http://127.0.0.1:3000".to_string()
}
fn default_upstream_timeout() -> u64 {
    2_000
}
fn default_true() -> bool {
    true
}
fn default_max_body_bytes() -> usize {
    64 * 1024
}

impl CoordinatorConfig {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_coord_bind(),
            availability_url: default_availability_url(),
            upstream_timeout_ms: default_upstream_timeout(),
            seed_waitlists: true,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Availability store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityConfig {
    /// Bind address for HTTP API
    #[serde(default = "default_availability_bind")]
    pub bind_addr: SocketAddr,

    /// Start with the four house tables
    #[serde(default = "default_true")]
    pub seed_tables: bool,
}

fn default_availability_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_availability_bind(),
            seed_tables: true,
        }
    }
}
