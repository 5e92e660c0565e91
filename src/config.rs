use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::github::DEFAULT_API_BASE;
use crate::pr::ignore::{IgnoreSet, DEFAULT_IGNORE_PATTERNS};

/// Config file looked up in the current directory.
pub const CONFIG_FILE: &str = ".pr-stats.toml";

const DEFAULT_SINCE_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid ignore pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Look-back window of {0} hours is out of range")]
    HoursOutOfRange(i64),
}

/// Top-level configuration loaded from .pr-stats.toml.
/// All fields are optional; the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,

    /// API root, for GitHub Enterprise installs.
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryConfig {
    /// Repository used when none is given on the command line
    pub repo: Option<String>,

    /// Look-back window used when no explicit cutoff is given
    pub since_hours: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// File name regexes excluded from change statistics
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ignore: default_ignore(),
        }
    }
}

fn default_ignore() -> Vec<String> {
    DEFAULT_IGNORE_PATTERNS.iter().map(|p| p.to_string()).collect()
}

impl Config {
    /// Load configuration from `path`, or from .pr-stats.toml in the current
    /// directory when no path is given. A missing default file yields
    /// `Config::default()`; a missing explicit path is an error.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = Path::new(CONFIG_FILE);
                if path.exists() {
                    Self::load_from(path)?
                } else {
                    Config::default()
                }
            }
        };

        if config.github.token.is_none() {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                config.github.token = Some(token);
            }
        }

        Ok(config)
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the GitHub token: config file value takes precedence,
    /// falls back to GITHUB_TOKEN env var.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
    }

    pub fn api_base(&self) -> &str {
        self.github.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    pub fn since_hours(&self) -> i64 {
        self.query.since_hours.unwrap_or(DEFAULT_SINCE_HOURS)
    }

    /// Cutoff instant: `hours` (or the configured window) before `now`.
    /// The window must be non-negative and representable.
    pub fn cutoff(
        &self,
        hours: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, ConfigError> {
        let hours = hours.unwrap_or_else(|| self.since_hours());
        if hours < 0 {
            return Err(ConfigError::HoursOutOfRange(hours));
        }
        Duration::try_hours(hours)
            .and_then(|window| now.checked_sub_signed(window))
            .ok_or(ConfigError::HoursOutOfRange(hours))
    }

    /// Compile the configured ignore patterns.
    pub fn ignore_set(&self) -> Result<IgnoreSet, ConfigError> {
        Ok(IgnoreSet::new(&self.filter.ignore)?)
    }
}
