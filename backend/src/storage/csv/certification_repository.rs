//! # CSV Certification Repository
//!
//! Stores the acquired certifications in `certifications.csv` at the root of
//! the data directory.
//!
//! ## File Format
//!
//! ```text
//! cert_id,acquired_date,expiry_date
//! pca,2024-01-01,2026-01-01
//! ace,2023-06-15,2026-06-15
//! ```
//!
//! A file that cannot be parsed is treated as an empty collection (and
//! logged) so a corrupt file never blocks the app. The next write replaces
//! it.

use anyhow::Result;
use log::{debug, info, warn};
use shared::AcquiredCertification;

use super::connection::CsvConnection;
use crate::storage::CertificationStorage;

const CERTIFICATIONS_FILE: &str = "certifications.csv";
const HEADER: [&str; 3] = ["cert_id", "acquired_date", "expiry_date"];

/// CSV-based acquired certification repository
#[derive(Debug, Clone)]
pub struct CertificationRepository {
    connection: CsvConnection,
}

impl CertificationRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn parse(content: &str) -> Result<Vec<AcquiredCertification>, ::csv::Error> {
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(::csv::Trim::All)
            .from_reader(content.as_bytes());

        reader.deserialize().collect()
    }

    fn load(&self) -> Result<Vec<AcquiredCertification>> {
        let content = match self.connection.read_optional(CERTIFICATIONS_FILE)? {
            Some(content) => content,
            None => {
                debug!("No {} found, starting empty", CERTIFICATIONS_FILE);
                return Ok(Vec::new());
            }
        };

        match Self::parse(&content) {
            Ok(certifications) => {
                debug!("Loaded {} acquired certifications", certifications.len());
                Ok(certifications)
            }
            Err(e) => {
                warn!(
                    "Could not parse {}: {}. Treating stored certifications as empty.",
                    CERTIFICATIONS_FILE, e
                );
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, certifications: &[AcquiredCertification]) -> Result<()> {
        let mut writer = ::csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        writer.write_record(HEADER)?;
        for certification in certifications {
            writer.serialize(certification)?;
        }
        let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("{}", e))?;

        self.connection.write_atomic(CERTIFICATIONS_FILE, &bytes)?;
        debug!("Saved {} acquired certifications", certifications.len());
        Ok(())
    }
}

impl CertificationStorage for CertificationRepository {
    fn list_certifications(&self) -> Result<Vec<AcquiredCertification>> {
        self.load()
    }

    fn get_certification(&self, cert_id: &str) -> Result<Option<AcquiredCertification>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|certification| certification.cert_id == cert_id))
    }

    fn store_certification(&self, certification: &AcquiredCertification) -> Result<()> {
        let mut certifications = self.load()?;
        certifications.push(certification.clone());
        self.save(&certifications)?;
        info!("Stored acquired certification '{}'", certification.cert_id);
        Ok(())
    }

    fn delete_certification(&self, cert_id: &str) -> Result<bool> {
        let mut certifications = self.load()?;
        let before = certifications.len();
        certifications.retain(|certification| certification.cert_id != cert_id);

        if certifications.len() == before {
            return Ok(false);
        }

        self.save(&certifications)?;
        info!("Deleted acquired certification '{}'", cert_id);
        Ok(true)
    }

    fn replace_all(&self, certifications: &[AcquiredCertification]) -> Result<()> {
        self.save(certifications)?;
        info!("Replaced acquired certifications ({} entries)", certifications.len());
        Ok(())
    }
}
