//! Process configuration.
//!
//! Layered the usual way: optional `config/default.toml`, then `EIGENSCAN_*`
//! environment overrides on top. Endpoints and credentials always come from
//! the environment in deployment (`.env` is loaded by the binaries before
//! this runs).

use crate::backfill;
use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

fn default_tvl_url() -> String {
    crate::tvl::DEFAULT_TVL_URL.to_string()
}
fn default_from_block() -> u64 {
    backfill::DEFAULT_FROM_BLOCK
}
fn default_window_size() -> u64 {
    backfill::DEFAULT_WINDOW_SIZE
}
fn default_window_delay_ms() -> u64 {
    backfill::DEFAULT_WINDOW_DELAY.as_millis() as u64
}
fn default_queue_capacity() -> usize {
    1024
}
fn default_reconnect_delay_ms() -> u64 {
    1000
}
fn default_kpi_interval_seconds() -> u64 {
    3600
}
fn default_empty() -> String {
    String::new()
}

#[derive(Debug, Deserialize, Clone)]
pub struct Backfill {
    #[serde(default = "default_from_block")]
    pub from_block: u64,
    #[serde(default = "default_window_size")]
    pub window_size: u64,
    #[serde(default = "default_window_delay_ms")]
    pub window_delay_ms: u64,
}

impl Default for Backfill {
    fn default() -> Self {
        Self {
            from_block: default_from_block(),
            window_size: default_window_size(),
            window_delay_ms: default_window_delay_ms(),
        }
    }
}

impl Backfill {
    pub fn window_delay(&self) -> Duration {
        Duration::from_millis(self.window_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// HTTP RPC endpoint (historical queries, head block).
    #[serde(default = "default_empty")]
    pub rpc_http_url: String,
    /// Websocket endpoint (live subscriptions).
    #[serde(default = "default_empty")]
    pub rpc_ws_url: String,
    /// Postgres connection string, credentials included.
    #[serde(default = "default_empty")]
    pub database_url: String,
    #[serde(default = "default_tvl_url")]
    pub tvl_url: String,
    #[serde(default)]
    pub backfill: Backfill,
    /// Per-subscription live queue capacity.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "default_kpi_interval_seconds")]
    pub kpi_interval_seconds: u64,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings: Settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .build()?
            .try_deserialize()?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("EIGENSCAN_RPC_HTTP_URL") {
            self.rpc_http_url = url;
        }
        if let Ok(url) = env::var("EIGENSCAN_RPC_WS_URL") {
            self.rpc_ws_url = url;
        }
        if let Ok(url) = env::var("EIGENSCAN_DATABASE_URL").or_else(|_| env::var("DATABASE_URL")) {
            self.database_url = url;
        }
        if let Ok(url) = env::var("EIGENSCAN_TVL_URL") {
            self.tvl_url = url;
        }
        if let Ok(raw) = env::var("EIGENSCAN_BACKFILL_FROM_BLOCK") {
            if let Ok(block) = raw.parse() {
                self.backfill.from_block = block;
            }
        }
        if let Ok(raw) = env::var("EIGENSCAN_BACKFILL_WINDOW_SIZE") {
            if let Ok(size) = raw.parse() {
                self.backfill.window_size = size;
            }
        }
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn kpi_interval(&self) -> Duration {
        Duration::from_secs(self.kpi_interval_seconds)
    }
}
