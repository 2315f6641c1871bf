//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.
//!
//! All operations are synchronous; the tracker is a single-user local app.

use anyhow::Result;
use shared::{AcquiredCertification, NotificationSettings};

use crate::domain::models::notification::NotificationCheckpoint;

/// Trait defining the interface for acquired-certification storage operations
///
/// Implementations recover from unreadable data by returning an empty
/// collection; only I/O failures are reported as errors.
pub trait CertificationStorage: Send + Sync {
    /// List all acquired certifications in insertion order
    fn list_certifications(&self) -> Result<Vec<AcquiredCertification>>;

    /// Retrieve a specific acquired certification by certification ID
    fn get_certification(&self, cert_id: &str) -> Result<Option<AcquiredCertification>>;

    /// Append a new acquired certification
    ///
    /// Duplicate checks are the caller's responsibility.
    fn store_certification(&self, certification: &AcquiredCertification) -> Result<()>;

    /// Delete an acquired certification
    /// Returns true if the certification was found and deleted, false otherwise
    fn delete_certification(&self, cert_id: &str) -> Result<bool>;

    /// Replace the whole collection
    fn replace_all(&self, certifications: &[AcquiredCertification]) -> Result<()>;
}

/// Trait defining the interface for notification settings storage
pub trait NotificationSettingsStorage: Send + Sync {
    /// Get the stored settings, or the defaults on first run
    fn get_settings(&self) -> Result<NotificationSettings>;

    /// Persist the settings
    fn store_settings(&self, settings: &NotificationSettings) -> Result<()>;
}

/// Trait defining the interface for the daily notification checkpoint
pub trait CheckpointStorage: Send + Sync {
    fn get_checkpoint(&self) -> Result<NotificationCheckpoint>;

    fn store_checkpoint(&self, checkpoint: &NotificationCheckpoint) -> Result<()>;
}
