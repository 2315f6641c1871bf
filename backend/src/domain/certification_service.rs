use anyhow::Result;
use chrono::NaiveDate;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::catalog::CertificationCatalog;
use crate::domain::expiry_policy::{
    build_certification_view, compute_total_allowance, days_until_expiry, needs_attention,
    select_attention_set,
};
use crate::domain::models::certification::{new_acquired_certification, CertificationError};
use crate::storage::{CertificationStorage, CsvConnection};
use crate::storage::csv::CertificationRepository;
use shared::{
    format_allowance, AcquiredCertification, AddCertificationRequest, AddCertificationResponse,
    CatalogEntry, CertificationFilter, CertificationSummary, CertificationView,
    RemoveCertificationResponse,
};

/// Service for managing the user's acquired certifications
#[derive(Clone)]
pub struct CertificationService {
    certification_repository: CertificationRepository,
    catalog: Arc<CertificationCatalog>,
}

impl CertificationService {
    pub fn new(connection: CsvConnection, catalog: Arc<CertificationCatalog>) -> Self {
        Self {
            certification_repository: CertificationRepository::new(connection),
            catalog,
        }
    }

    pub fn catalog(&self) -> &CertificationCatalog {
        &self.catalog
    }

    /// Record a newly acquired certification
    pub fn add_certification(
        &self,
        request: AddCertificationRequest,
    ) -> Result<AddCertificationResponse> {
        info!("Adding certification: {:?}", request);

        let definition = self
            .catalog
            .find(&request.cert_id)
            .ok_or_else(|| CertificationError::UnknownCertification(request.cert_id.clone()))?;

        if self
            .certification_repository
            .get_certification(&request.cert_id)?
            .is_some()
        {
            warn!("Rejected duplicate certification '{}'", request.cert_id);
            return Err(CertificationError::Duplicate(request.cert_id).into());
        }

        let certification = new_acquired_certification(definition, request.acquired_date)?;
        self.certification_repository
            .store_certification(&certification)?;

        info!(
            "Added {} (acquired {}, expires {})",
            definition.name, certification.acquired_date, certification.expiry_date
        );

        Ok(AddCertificationResponse {
            success_message: format!("{} added", definition.name),
            certification,
        })
    }

    /// Remove one acquired certification
    pub fn remove_certification(&self, cert_id: &str) -> Result<RemoveCertificationResponse> {
        info!("Removing certification: {}", cert_id);

        if !self.certification_repository.delete_certification(cert_id)? {
            return Err(CertificationError::NotFound(cert_id.to_string()).into());
        }

        let name = self
            .catalog
            .find(cert_id)
            .map(|definition| definition.name.as_str())
            .unwrap_or(cert_id);

        Ok(RemoveCertificationResponse {
            removed: true,
            success_message: format!("{} removed", name),
        })
    }

    /// Drop every acquired certification
    pub fn reset_all(&self) -> Result<()> {
        self.certification_repository.replace_all(&[])?;
        info!("Reset all certification data");
        Ok(())
    }

    pub fn list_acquired(&self) -> Result<Vec<AcquiredCertification>> {
        self.certification_repository.list_certifications()
    }

    /// Acquired certifications joined with the catalog, filtered.
    ///
    /// Records whose id is no longer in the catalog are skipped.
    pub fn list_certifications(
        &self,
        filter: CertificationFilter,
        today: NaiveDate,
    ) -> Result<Vec<CertificationView>> {
        let acquired = self.list_acquired()?;

        let views = acquired
            .iter()
            .filter_map(|certification| {
                let definition = self.catalog.find(&certification.cert_id);
                if definition.is_none() {
                    warn!(
                        "Skipping certification '{}': not in catalog",
                        certification.cert_id
                    );
                }
                definition.map(|definition| (certification, definition))
            })
            .filter(|(certification, _)| {
                let attention = needs_attention(days_until_expiry(certification.expiry_date, today));
                match filter {
                    CertificationFilter::All => true,
                    CertificationFilter::Expiring => attention,
                    CertificationFilter::Valid => !attention,
                }
            })
            .map(|(certification, definition)| build_certification_view(certification, definition, today))
            .collect();

        Ok(views)
    }

    pub fn total_allowance(&self, today: NaiveDate) -> Result<u32> {
        let acquired = self.list_acquired()?;
        Ok(compute_total_allowance(&acquired, &self.catalog, today))
    }

    /// Capped total, counts and alert lines
    pub fn get_summary(&self, today: NaiveDate) -> Result<CertificationSummary> {
        let acquired = self.list_acquired()?;
        let total_allowance = compute_total_allowance(&acquired, &self.catalog, today);
        let attention = select_attention_set(&acquired, &self.catalog, today);

        let alerts = attention
            .iter()
            .filter_map(|certification| {
                let definition = self.catalog.find(&certification.cert_id)?;
                let view = build_certification_view(certification, definition, today);
                Some(format!("{} - {}", view.name, view.status_message))
            })
            .collect();

        Ok(CertificationSummary {
            total_allowance,
            formatted_total: format_allowance(total_allowance),
            certification_count: acquired.len(),
            attention_count: attention.len(),
            alerts,
        })
    }

    /// Every catalog definition with an "already acquired" marker
    pub fn get_catalog(&self) -> Result<Vec<CatalogEntry>> {
        let acquired = self.list_acquired()?;

        Ok(self
            .catalog
            .definitions()
            .iter()
            .map(|definition| CatalogEntry {
                definition: definition.clone(),
                acquired: acquired
                    .iter()
                    .any(|certification| certification.cert_id == definition.id),
            })
            .collect())
    }
}
