//! # Configuration Management Module
//!
//! Loading, defaults and validation for the mudlens configuration file.
//!
//! ## Configuration Structure
//!
//! - [`WorldConfig`] - where the world dataset lives
//! - [`AnalysisConfig`] - recursion cap, low-probability threshold, scripted policy
//! - [`AccessibilityConfig`] - restricted zone flags and reserved zone ids
//! - [`LoggingConfig`] - log level and optional log file
//! - [`ScriptedItemConfig`] - extra script-created items (`[[scripted_items]]`)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mudlens::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Write a starter file, then read it back
//!     Config::create_default("mudlens.toml").await?;
//!     let config = Config::load("mudlens.toml").await?;
//!     config.validate()?;
//!
//!     println!("World root: {}", config.world.root);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [world]
//! root = "world"
//!
//! [analysis]
//! max_depth = 32
//! low_probability_threshold = 20.0
//! scripted_is_fully_accessible = false
//!
//! [accessibility]
//! restricted_flags = ["ADMIN", "GODZONE", "IMMORTAL", "DEV", "TEST", "CLOSED"]
//! reserved_zones = [0, 12]
//!
//! [logging]
//! level = "info"    # default "warn"; -v/-vv raise it to debug/trace
//! file = "mudlens.log"
//!
//! [[scripted_items]]
//! target = 19002
//! target_name = "the Armor of the Gods"
//! creator = 18226
//! creator_name = "Kharas"
//! creator_zone = 180
//! procedure = "mob_kharas"
//! requirements = "Bring Kharas his hammer and materials"
//! ```
//!
//! Every section is optional. Precedence: CLI args > config file > defaults.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::assembly::zones::DEFAULT_RESTRICTED_FLAGS;

/// Default configuration file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "mudlens.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub accessibility: AccessibilityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Script-created items added to (or overriding) the built-in registry.
    #[serde(default)]
    pub scripted_items: Vec<ScriptedItemConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Directory holding one numeric subdirectory per zone.
    pub root: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            root: "world".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Maximum nested-recipe depth before a component is reported as depth exceeded.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Components resolved below this percentage downgrade the verdict to partial.
    #[serde(default = "default_low_probability_threshold")]
    pub low_probability_threshold: f64,
    /// Treat components that only come from scripted procedures as fully accessible.
    #[serde(default)]
    pub scripted_is_fully_accessible: bool,
}

fn default_max_depth() -> usize {
    32
}

fn default_low_probability_threshold() -> f64 {
    20.0
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            low_probability_threshold: default_low_probability_threshold(),
            scripted_is_fully_accessible: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessibilityConfig {
    /// Zone flags (case-insensitive) that close a zone to ordinary players.
    #[serde(default = "default_restricted_flags")]
    pub restricted_flags: Vec<String>,
    /// Zone ids closed regardless of their flags.
    #[serde(default)]
    pub reserved_zones: Vec<u32>,
}

fn default_restricted_flags() -> Vec<String> {
    DEFAULT_RESTRICTED_FLAGS
        .iter()
        .map(|f| f.to_string())
        .collect()
}

impl Default for AccessibilityConfig {
    fn default() -> Self {
        Self {
            restricted_flags: default_restricted_flags(),
            reserved_zones: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedItemConfig {
    /// Object vnum produced by the procedure.
    pub target: u32,
    #[serde(default)]
    pub target_name: String,
    /// Mobile vnum running the procedure.
    pub creator: u32,
    #[serde(default)]
    pub creator_name: String,
    pub creator_zone: u32,
    pub procedure: String,
    #[serde(default)]
    pub requirements: String,
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

impl Config {
    /// Load configuration from a TOML file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject values the analyzer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.world.root.trim().is_empty() {
            return Err(anyhow!("world.root must not be empty"));
        }
        if self.analysis.max_depth == 0 {
            return Err(anyhow!("analysis.max_depth must be at least 1"));
        }
        let threshold = self.analysis.low_probability_threshold;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(anyhow!(
                "analysis.low_probability_threshold must be within 0..=100 (got {})",
                threshold
            ));
        }
        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(anyhow!("logging.level '{}' is not a log level", self.logging.level));
        }
        for item in &self.scripted_items {
            if item.target == 0 || item.creator == 0 {
                return Err(anyhow!(
                    "scripted item '{}' needs non-zero target and creator vnums",
                    item.procedure
                ));
            }
            if item.procedure.trim().is_empty() {
                return Err(anyhow!("scripted item {} has no procedure", item.target));
            }
        }
        Ok(())
    }
}
