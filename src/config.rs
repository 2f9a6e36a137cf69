//! User configuration (`~/.dealerdash/config.json`)
//!
//! Every field has a default, so a missing file or a partial file is fine.
//! CLI flags override what is loaded here.

use chrono::{FixedOffset, Weekday};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::services::BucketPlan;
use crate::types::{DashError, Granularity, Result};

/// Default HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default number of rows in ranking tables
const TOP_N: usize = 5;

/// Largest bucket window accepted from the config file or the command line
pub const MAX_WINDOW: usize = 1_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// First day of a reporting week
    pub week_start: Weekday,
    /// Offset used for calendar boundaries, in minutes east of UTC
    pub utc_offset_minutes: i32,
    pub weekly_window: usize,
    pub monthly_window: usize,
    pub yearly_window: usize,
    pub top_n: usize,
    /// Directory holding `<collection>.json` snapshot envelopes
    pub data_dir: Option<PathBuf>,
    /// Backend API base URL
    pub api_base_url: Option<String>,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            week_start: Weekday::Mon,
            utc_offset_minutes: 0,
            weekly_window: Granularity::Week.default_count(),
            monthly_window: Granularity::Month.default_count(),
            yearly_window: Granularity::Year.default_count(),
            top_n: TOP_N,
            data_dir: None,
            api_base_url: None,
            api_token: None,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                tracing::debug!("no home directory, using default config: {}", e);
                Ok(Self::default())
            }
        }
    }

    /// Load from `path`. A missing file yields defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            DashError::Config(format!("invalid config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config path (~/.dealerdash/config.json)
    pub fn default_path() -> Result<PathBuf> {
        let home = directories::UserDirs::new()
            .ok_or_else(|| DashError::Config("Failed to get home directory".into()))?
            .home_dir()
            .to_path_buf();
        Ok(home.join(".dealerdash").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        self.utc_offset()?;
        for (name, window) in [
            ("weekly_window", self.weekly_window),
            ("monthly_window", self.monthly_window),
            ("yearly_window", self.yearly_window),
        ] {
            if window > MAX_WINDOW {
                return Err(DashError::Config(format!(
                    "{} must be at most {}, got {}",
                    name, MAX_WINDOW, window
                )));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(DashError::Config(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                DashError::Config(format!(
                    "utc_offset_minutes out of range: {}",
                    self.utc_offset_minutes
                ))
            })
    }

    pub fn bucket_plan(&self) -> Result<BucketPlan> {
        Ok(BucketPlan::new(self.week_start, self.utc_offset()?))
    }

    /// Number of buckets to show for `granularity`
    pub fn window(&self, granularity: Granularity) -> usize {
        match granularity {
            Granularity::Week => self.weekly_window,
            Granularity::Month => self.monthly_window,
            Granularity::Year => self.yearly_window,
        }
    }
}
