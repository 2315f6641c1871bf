//! # Certification Allowance Backend
//!
//! Tracks acquired certifications, computes the monthly certification
//! allowance and decides which reminders to send.
//!
//! - [`domain`]: policies and services
//! - [`storage`]: file-based persistence in a single data directory
//! - [`notifier`]: notification delivery adapters
//! - [`io`]: the command line interface
//! - [`config`]: data directory and `config.yaml`

use anyhow::Result;
use log::info;
use std::path::Path;
use std::sync::Arc;

pub mod config;
pub mod domain;
pub mod io;
pub mod notifier;
pub mod storage;

pub use config::AppConfig;
pub use storage::csv::CsvConnection;

use notifier::NotificationCapability;
use storage::csv::CatalogRepository;

/// Main backend struct that wires every service onto one data directory
pub struct Backend {
    pub certification_service: domain::CertificationService,
    pub notification_service: domain::NotificationService,
    pub config: AppConfig,
}

impl Backend {
    pub fn new<P: AsRef<Path>>(
        data_directory: P,
        notifier: Arc<dyn NotificationCapability>,
    ) -> Result<Self> {
        let connection = CsvConnection::new(data_directory)?;
        info!("Using data directory {}", connection.base_directory().display());

        let config = AppConfig::load(&connection)?;
        let catalog = Arc::new(CatalogRepository::new(connection.clone()).load_catalog()?);

        let certification_service =
            domain::CertificationService::new(connection.clone(), catalog);
        let notification_service = domain::NotificationService::new(
            connection,
            certification_service.clone(),
            notifier,
        );

        Ok(Backend {
            certification_service,
            notification_service,
            config,
        })
    }
}
