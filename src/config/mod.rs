//! # Configuration Management Module
//!
//! TOML-backed configuration for the dungeon server, organized into logical
//! sections:
//!
//! - [`ServerConfig`] - bind address and the server-wide limits (players,
//!   dungeons, inventory slots)
//! - [`WorldConfig`] - paths to the three world descriptor files
//! - [`TimingConfig`] - login re-poll cadence and the gate/login wait caps
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mudkeep::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Server name: {}", config.server.name);
//!     Ok(())
//! }
//! ```
//!
//! CLI arguments override config values, which override the defaults.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Display name shown in the main menu.
    pub name: String,
    pub bind: String,
    pub port: u16,
    /// Global cap on concurrently connected players.
    pub max_players: u32,
    /// Cap on dungeon instances in the catalog.
    pub max_dungeons: u32,
    /// Fixed number of inventory slots handed to each player.
    pub inventory_slots: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub edges_file: String,
    pub messages_file: String,
    pub items_file: String,
}

impl WorldConfig {
    pub fn edges_path(&self) -> &Path {
        Path::new(&self.edges_file)
    }

    pub fn messages_path(&self) -> &Path {
        Path::new(&self.messages_file)
    }

    pub fn items_path(&self) -> &Path {
        Path::new(&self.items_file)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Seconds between login re-polls while waitlisted.
    #[serde(default = "default_login_poll_secs")]
    pub login_poll_secs: u64,
    /// Total seconds a waitlisted session keeps polling before giving up.
    #[serde(default = "default_login_wait_cap_secs")]
    pub login_wait_cap_secs: u64,
    /// Milliseconds an operation waits for the world gate before reporting
    /// the server busy.
    #[serde(default = "default_gate_wait_ms")]
    pub gate_wait_ms: u64,
}

fn default_login_poll_secs() -> u64 {
    5
}

fn default_login_wait_cap_secs() -> u64 {
    300
}

fn default_gate_wait_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub world: WorldConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    pub logging: LoggingConfig,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            login_poll_secs: default_login_poll_secs(),
            login_wait_cap_secs: default_login_wait_cap_secs(),
            gate_wait_ms: default_gate_wait_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                name: "mudkeep".to_string(),
                bind: "0.0.0.0".to_string(),
                port: 4040,
                max_players: 3,
                max_dungeons: 2,
                inventory_slots: 16,
            },
            world: WorldConfig {
                edges_file: "world/default.edg".to_string(),
                messages_file: "world/default.msg".to_string(),
                items_file: "world/default.thg".to_string(),
            },
            timing: TimingConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                file: None,
            },
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Write a default configuration file.
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject configurations that could not run: zeroed limits or timers.
    pub fn validate(&self) -> Result<()> {
        if self.server.max_players == 0 {
            return Err(anyhow!("server.max_players must be at least 1"));
        }
        if self.server.max_dungeons == 0 {
            return Err(anyhow!("server.max_dungeons must be at least 1"));
        }
        if self.server.inventory_slots == 0 {
            return Err(anyhow!("server.inventory_slots must be at least 1"));
        }
        if self.timing.login_poll_secs == 0 {
            return Err(anyhow!("timing.login_poll_secs must be at least 1"));
        }
        if self.timing.gate_wait_ms == 0 {
            return Err(anyhow!("timing.gate_wait_ms must be at least 1"));
        }
        Ok(())
    }

    /// The directory holding the world descriptor files, for `init`.
    pub fn world_dir(&self) -> PathBuf {
        self.world
            .edges_path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
