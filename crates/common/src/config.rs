//! Report configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Default file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "thyme.toml";

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThymeConfig {
    /// Quiet period before a burst of completions is reported as finished
    pub debounce_ms: u64,

    /// How execution hooks nest relative to registration order
    pub nesting: Nesting,

    /// Preference store file (None = in-memory only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefs_path: Option<PathBuf>,

    /// Directory receiving `index.html` and `thyme-results.json`
    pub output_dir: PathBuf,

    /// Built-in contributions to leave out, by name
    pub disabled_contributions: Vec<String>,

    /// Page configuration
    pub page: PageConfig,
}

impl Default for ThymeConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 10,
            nesting: Nesting::default(),
            prefs_path: None,
            output_dir: PathBuf::from("thyme-report"),
            disabled_contributions: Vec::new(),
            page: PageConfig::default(),
        }
    }
}

/// Page-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Document title before any counts are prefixed
    pub title: String,

    /// Page address, including the query string carrying the filter
    pub url: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            url: "index.html".to_string(),
        }
    }
}

/// Nesting of execution-wrapping hooks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nesting {
    /// Earlier registrations wrap later ones
    #[default]
    OuterFirst,
    /// Later registrations wrap earlier ones
    InnerFirst,
}

impl ThymeConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the shell cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.debounce_ms == 0 {
            return Err(Error::InvalidConfig(
                "debounce_ms must be at least 1".to_string(),
            ));
        }
        crate::location::Location::parse(&self.page.url)?;
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
