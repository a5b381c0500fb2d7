use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use badge_shared_util::AccountId;
use badge_tracker::FixedCounts;
use serde::{Deserialize, Serialize};

/// Contents of `badged.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BadgedConfig {
    /// Account that is logged in at startup.
    pub active_account: Option<AccountId>,
    /// Unread notification count served for each account.
    pub counts: HashMap<AccountId, u32>,
    /// Accounts whose count can't be fetched.
    pub failing: Vec<AccountId>,
    /// Artificial latency of every count fetch.
    pub fetch_delay_ms: u64,
}

impl BadgedConfig {
    /// Load the configuration from `path`, or from the default location if no path is given.
    /// A missing file at the default location yields the default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read_from_file(path),
            None => {
                let path = default_config_path()?;
                if path.exists() {
                    Self::read_from_file(&path)
                } else {
                    log::info!("No configuration at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn read_from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::from_json_str(&content).with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }

    /// Build the count source described by this configuration.
    pub fn count_source(&self) -> FixedCounts {
        let source = FixedCounts::from_counts(self.counts.clone()).with_delay(self.fetch_delay());
        for account in &self.failing {
            source.set_failing(account.clone(), true);
        }
        source
    }
}

/// `$XDG_CONFIG_HOME/badged/badged.json`, falling back to `~/.config`.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => PathBuf::from(std::env::var("HOME").context("Neither XDG_CONFIG_HOME nor HOME is set")?).join(".config"),
    };
    Ok(config_dir.join("badged").join("badged.json"))
}
