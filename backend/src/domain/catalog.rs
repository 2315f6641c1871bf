//! Certification catalog.
//!
//! The catalog is the static reference table of certifications the allowance
//! is paid for. It is loaded once at startup (built-in table, or a
//! `catalog.yaml` override in the data directory) and never mutated.

use log::warn;
use shared::CertificationDefinition;
use std::collections::HashSet;

/// Ordered, read-only table of certification definitions
#[derive(Debug, Clone, PartialEq)]
pub struct CertificationCatalog {
    definitions: Vec<CertificationDefinition>,
}

impl CertificationCatalog {
    /// Build a catalog from definitions, keeping the first entry for a repeated id
    pub fn from_definitions(definitions: Vec<CertificationDefinition>) -> Self {
        let mut seen = HashSet::new();
        let definitions = definitions
            .into_iter()
            .filter(|definition| {
                let first = seen.insert(definition.id.clone());
                if !first {
                    warn!("Ignoring repeated catalog id '{}'", definition.id);
                }
                first
            })
            .collect();

        Self { definitions }
    }

    /// The certifications the allowance scheme ships with
    pub fn builtin() -> Self {
        let entries: [(&str, &str, &str, u32, u32); 18] = [
            // Google Cloud - Associate / Foundational
            ("cdl", "Cloud Digital Leader", "Google Cloud", 5000, 3),
            ("gail", "Generative AI Leader", "Google Cloud", 5000, 3),
            ("ace", "Associate Cloud Engineer", "Google Cloud", 5000, 3),
            ("agwa", "Associate Google Workspace Administrator", "Google Cloud", 5000, 3),
            ("adp", "Associate Data Practitioner", "Google Cloud", 5000, 3),
            // Google Cloud - Professional
            ("pca", "Professional Cloud Architect", "Google Cloud", 10000, 2),
            ("pdbe", "Professional Database Engineer", "Google Cloud", 10000, 2),
            ("pcdev", "Professional Cloud Developer", "Google Cloud", 10000, 2),
            ("pde", "Professional Data Engineer", "Google Cloud", 10000, 2),
            ("pcdoe", "Professional Cloud DevOps Engineer", "Google Cloud", 10000, 2),
            ("pcse", "Professional Cloud Security Engineer", "Google Cloud", 10000, 2),
            ("pcne", "Professional Cloud Network Engineer", "Google Cloud", 10000, 2),
            ("pmle", "Professional Machine Learning Engineer", "Google Cloud", 10000, 2),
            ("psoe", "Professional Security Operations Engineer", "Google Cloud", 10000, 2),
            // Other vendors
            ("pcoa", "Professional ChromeOS Administrator", "Chrome OS", 5000, 3),
            ("ckad", "Certified Kubernetes Application Developer", "CNCF", 10000, 3),
            ("cka", "Certified Kubernetes Administrator", "CNCF", 10000, 3),
            ("pmp", "PMP", "PMI", 10000, 3),
        ];

        Self::from_definitions(
            entries
                .iter()
                .map(|(id, name, category, allowance, valid_years)| CertificationDefinition {
                    id: id.to_string(),
                    name: name.to_string(),
                    category: category.to_string(),
                    allowance: *allowance,
                    valid_years: *valid_years,
                })
                .collect(),
        )
    }

    pub fn find(&self, cert_id: &str) -> Option<&CertificationDefinition> {
        self.definitions.iter().find(|definition| definition.id == cert_id)
    }

    pub fn contains(&self, cert_id: &str) -> bool {
        self.find(cert_id).is_some()
    }

    pub fn definitions(&self) -> &[CertificationDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for CertificationCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
