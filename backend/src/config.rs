//! Application configuration.
//!
//! The data directory is resolved from the command line, then the
//! `CERT_ALLOWANCE_DATA_DIR` environment variable, then the platform data
//! directory. Inside it an optional hand-edited `config.yaml` tunes the
//! background behaviour:
//!
//! ```yaml
//! check_interval_minutes: 60
//! reminder_hour: 9
//! ```

use anyhow::{anyhow, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::storage::CsvConnection;

pub const DATA_DIR_ENV: &str = "CERT_ALLOWANCE_DATA_DIR";

const APP_DIR_NAME: &str = "certification-allowance";
const CONFIG_FILE: &str = "config.yaml";

/// Longest allowed gap between daily checks in `watch` mode
pub const MAX_CHECK_INTERVAL_MINUTES: u64 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Minutes between daily check runs in `watch` mode
    pub check_interval_minutes: u64,
    /// Local hour at which the salary-day alarm fires
    pub reminder_hour: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            check_interval_minutes: 60,
            reminder_hour: 9,
        }
    }
}

impl AppConfig {
    /// Load `config.yaml`; a missing or unusable file gives the defaults
    pub fn load(connection: &CsvConnection) -> Result<Self> {
        let yaml_content = match connection.read_optional(CONFIG_FILE)? {
            Some(content) if !content.trim().is_empty() => content,
            _ => {
                debug!("No {} found, using default configuration", CONFIG_FILE);
                return Ok(Self::default());
            }
        };

        let config = match serde_yaml::from_str::<AppConfig>(&yaml_content) {
            Ok(config) => config,
            Err(e) => {
                warn!("Could not parse {}: {}. Using defaults.", CONFIG_FILE, e);
                return Ok(Self::default());
            }
        };

        Ok(config.sanitized())
    }

    fn sanitized(self) -> Self {
        let defaults = Self::default();

        let check_interval_minutes = match self.check_interval_minutes {
            0 => {
                warn!("check_interval_minutes must be positive, using {}", defaults.check_interval_minutes);
                defaults.check_interval_minutes
            }
            minutes if minutes > MAX_CHECK_INTERVAL_MINUTES => {
                warn!(
                    "check_interval_minutes {} is longer than a day, using {}",
                    minutes, MAX_CHECK_INTERVAL_MINUTES
                );
                MAX_CHECK_INTERVAL_MINUTES
            }
            minutes => minutes,
        };

        let reminder_hour = if self.reminder_hour > 23 {
            warn!("reminder_hour {} is not an hour of the day, using {}", self.reminder_hour, defaults.reminder_hour);
            defaults.reminder_hour
        } else {
            self.reminder_hour
        };

        Self {
            check_interval_minutes,
            reminder_hour,
        }
    }
}

/// Pick the data directory: explicit path first, then the platform default
pub fn resolve_data_directory(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| anyhow!("Could not determine a data directory; pass --data-dir"))
}
