//! # File Storage Module
//!
//! File-based storage implementation. Everything lives in one data
//! directory:
//!
//! ```text
//! data/
//! ├── config.yaml                  (optional, see crate::config)
//! ├── catalog.yaml                 (optional catalog override)
//! ├── certifications.csv           acquired certifications
//! ├── notification_settings.yaml   notification preferences
//! └── global_config.yaml           daily check bookkeeping
//! ```
//!
//! All writes use a temp file followed by a rename.

pub mod catalog_repository;
pub mod certification_repository;
pub mod connection;
pub mod global_config_repository;
pub mod notification_settings_repository;

#[cfg(test)]
pub mod test_utils;

pub use catalog_repository::CatalogRepository;
pub use certification_repository::CertificationRepository;
pub use connection::CsvConnection;
pub use global_config_repository::{GlobalConfig, GlobalConfigRepository};
pub use notification_settings_repository::NotificationSettingsRepository;
