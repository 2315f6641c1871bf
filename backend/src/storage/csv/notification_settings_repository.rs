//! # Notification Settings Repository
//!
//! Keeps the single [`NotificationSettings`] record in
//! `notification_settings.yaml`.
//!
//! ```yaml
//! enabled: true
//! salary_day_enabled: true
//! salary_day: 25
//! renewal_enabled: true
//! daily_check_enabled: true
//! ```
//!
//! Missing fields take their default value; an unreadable file falls back
//! to the defaults.

use anyhow::Result;
use log::{debug, info, warn};
use shared::NotificationSettings;

use super::connection::CsvConnection;
use crate::storage::NotificationSettingsStorage;

const SETTINGS_FILE: &str = "notification_settings.yaml";

#[derive(Debug, Clone)]
pub struct NotificationSettingsRepository {
    connection: CsvConnection,
}

impl NotificationSettingsRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }
}

impl NotificationSettingsStorage for NotificationSettingsRepository {
    fn get_settings(&self) -> Result<NotificationSettings> {
        let yaml_content = match self.connection.read_optional(SETTINGS_FILE)? {
            Some(content) => content,
            None => {
                debug!("No notification settings stored, using defaults");
                return Ok(NotificationSettings::default());
            }
        };

        match serde_yaml::from_str::<NotificationSettings>(&yaml_content) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!("Could not parse {}: {}. Using default settings.", SETTINGS_FILE, e);
                Ok(NotificationSettings::default())
            }
        }
    }

    fn store_settings(&self, settings: &NotificationSettings) -> Result<()> {
        let yaml_content = serde_yaml::to_string(settings)?;
        self.connection.write_atomic(SETTINGS_FILE, yaml_content.as_bytes())?;
        info!("Saved notification settings");
        Ok(())
    }
}
