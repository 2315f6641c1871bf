//! # Domain Module
//!
//! Business logic for the certification allowance tracker.
//!
//! ## Policies
//!
//! Pure functions with `today` passed in, no storage or clock access:
//!
//! - [`expiry_policy`]: days until expiry, statuses, the attention set and
//!   the capped monthly total
//! - [`notification_policy`]: which salary-day and renewal notifications fire
//!   on a given day
//!
//! ## Services
//!
//! - [`CertificationService`]: add, remove and list acquired certifications
//! - [`NotificationService`]: settings, the daily check and alarm scheduling
//!
//! Services sit between the io layer and [`crate::storage`], and hand
//! fired events to a [`crate::notifier::NotificationCapability`].

pub mod catalog;
pub mod certification_service;
pub mod expiry_policy;
pub mod models;
pub mod notification_policy;
pub mod notification_service;

pub use catalog::CertificationCatalog;
pub use certification_service::CertificationService;
pub use notification_service::NotificationService;
