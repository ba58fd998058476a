//! skirmish - combat state tracker for narrated tabletop sessions
//!
//! Infers combat state from free-form narration and mirrors it to a
//! continuously edited display message.

pub mod announce;
pub mod combat;
pub mod console;
pub mod display;
pub mod extract;
pub mod store;
pub mod tracker;

use std::path::Path;

use anyhow::Result;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub use tracker::{CombatTracker, TrackerStatus, TrackerUpdate};

/// Identifies a chat channel; one combat session per channel
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ChannelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Tracker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Pending display updates held before new ones are dropped
    pub display_queue_capacity: usize,
    /// Log filter used when RUST_LOG is not set
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_queue_capacity: display::DEFAULT_QUEUE_CAPACITY,
            log_filter: "skirmish=info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration: defaults, then the TOML file (if given), then
    /// `SKIRMISH_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }
        let config: Config = figment.merge(Env::prefixed("SKIRMISH_")).extract()?;
        Ok(config)
    }
}
