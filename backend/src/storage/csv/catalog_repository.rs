//! # Catalog Repository
//!
//! Loads the certification catalog. A `catalog.yaml` in the data directory
//! replaces the built-in table:
//!
//! ```yaml
//! certifications:
//!   - id: pca
//!     name: Professional Cloud Architect
//!     category: Google Cloud
//!     allowance: 10000
//!     valid_years: 2
//! ```
//!
//! The file is read-only from the app's point of view.

use anyhow::Result;
use log::{info, warn};
use serde::Deserialize;
use shared::CertificationDefinition;

use super::connection::CsvConnection;
use crate::domain::catalog::CertificationCatalog;

const CATALOG_FILE: &str = "catalog.yaml";

#[derive(Debug, Deserialize)]
struct CatalogFile {
    certifications: Vec<CertificationDefinition>,
}

#[derive(Debug, Clone)]
pub struct CatalogRepository {
    connection: CsvConnection,
}

impl CatalogRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Load the catalog override, or the built-in catalog if there is none
    /// or it cannot be used
    pub fn load_catalog(&self) -> Result<CertificationCatalog> {
        let yaml_content = match self.connection.read_optional(CATALOG_FILE)? {
            Some(content) => content,
            None => return Ok(CertificationCatalog::builtin()),
        };

        match serde_yaml::from_str::<CatalogFile>(&yaml_content) {
            Ok(file) if file.certifications.is_empty() => {
                warn!("{} lists no certifications, using the built-in catalog", CATALOG_FILE);
                Ok(CertificationCatalog::builtin())
            }
            Ok(file) => {
                let catalog = CertificationCatalog::from_definitions(file.certifications);
                info!("Loaded {} certifications from {}", catalog.len(), CATALOG_FILE);
                Ok(catalog)
            }
            Err(e) => {
                warn!("Could not parse {}: {}. Using the built-in catalog.", CATALOG_FILE, e);
                Ok(CertificationCatalog::builtin())
            }
        }
    }
}
