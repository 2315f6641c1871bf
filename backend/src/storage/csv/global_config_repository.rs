//! # Global Config Repository
//!
//! Application bookkeeping in `global_config.yaml` at the root of the data
//! directory. Today it holds the daily notification checkpoint.
//!
//! ```yaml
//! last_notification_check: "2025-07-25"
//! created_at: "2025-01-21T19:30:00+00:00"
//! updated_at: "2025-07-25T09:00:00+00:00"
//! ```

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::connection::CsvConnection;
use crate::domain::models::notification::NotificationCheckpoint;
use crate::storage::CheckpointStorage;

const GLOBAL_CONFIG_FILE: &str = "global_config.yaml";

/// Global configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Date of the last completed daily notification check
    #[serde(default)]
    pub last_notification_check: Option<NaiveDate>,
    /// When the global config was first created
    pub created_at: String,
    /// When the global config was last updated
    pub updated_at: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            last_notification_check: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// File-based global config repository using a single YAML file
#[derive(Debug, Clone)]
pub struct GlobalConfigRepository {
    connection: CsvConnection,
}

impl GlobalConfigRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Load global config from file, falling back to a fresh one
    pub fn get_global_config(&self) -> Result<GlobalConfig> {
        let yaml_content = match self.connection.read_optional(GLOBAL_CONFIG_FILE)? {
            Some(content) => content,
            None => return Ok(GlobalConfig::default()),
        };

        match serde_yaml::from_str::<GlobalConfig>(&yaml_content) {
            Ok(config) => {
                debug!("Loaded global config");
                Ok(config)
            }
            Err(e) => {
                warn!("Could not parse {}: {}. Starting from a fresh config.", GLOBAL_CONFIG_FILE, e);
                Ok(GlobalConfig::default())
            }
        }
    }

    fn save_global_config(&self, config: &GlobalConfig) -> Result<()> {
        let mut updated = config.clone();
        updated.updated_at = Utc::now().to_rfc3339();

        let yaml_content = serde_yaml::to_string(&updated)?;
        self.connection.write_atomic(GLOBAL_CONFIG_FILE, yaml_content.as_bytes())?;
        debug!("Saved global config");
        Ok(())
    }
}

impl CheckpointStorage for GlobalConfigRepository {
    fn get_checkpoint(&self) -> Result<NotificationCheckpoint> {
        let config = self.get_global_config()?;
        Ok(NotificationCheckpoint {
            last_checked: config.last_notification_check,
        })
    }

    fn store_checkpoint(&self, checkpoint: &NotificationCheckpoint) -> Result<()> {
        let mut config = self.get_global_config()?;
        config.last_notification_check = checkpoint.last_checked;
        self.save_global_config(&config)?;

        match checkpoint.last_checked {
            Some(date) => info!("Recorded notification check for {}", date),
            None => info!("Cleared notification checkpoint"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;

    #[test]
    fn test_checkpoint_defaults_to_never_checked() {
        let env = TestEnvironment::new().unwrap();
        let repo = GlobalConfigRepository::new(env.connection.clone());

        assert_eq!(repo.get_checkpoint().unwrap(), NotificationCheckpoint::default());
    }

    #[test]
    fn test_store_checkpoint_round_trip_keeps_created_at() {
        let env = TestEnvironment::new().unwrap();
        let repo = GlobalConfigRepository::new(env.connection.clone());
        let today = NaiveDate::from_ymd_opt(2025, 7, 25).unwrap();

        repo.store_checkpoint(&NotificationCheckpoint::checked_on(today)).unwrap();
        let created_at = repo.get_global_config().unwrap().created_at;

        let tomorrow = today.succ_opt().unwrap();
        repo.store_checkpoint(&NotificationCheckpoint::checked_on(tomorrow)).unwrap();

        let config = repo.get_global_config().unwrap();
        assert_eq!(config.last_notification_check, Some(tomorrow));
        assert_eq!(config.created_at, created_at);
    }

    #[test]
    fn test_corrupt_file_means_never_checked() {
        let env = TestEnvironment::new().unwrap();
        env.connection
            .write_atomic(GLOBAL_CONFIG_FILE, b"last_notification_check: yesterday-ish\n")
            .unwrap();
        let repo = GlobalConfigRepository::new(env.connection.clone());

        assert_eq!(repo.get_checkpoint().unwrap(), NotificationCheckpoint::default());
    }
}
