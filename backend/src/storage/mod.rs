//! # Storage Module
//!
//! Handles all data persistence operations for the certification allowance
//! tracker.
//!
//! Domain services depend on the traits in [`traits`]; the only
//! implementation today is the file-based one in [`csv`], which keeps the
//! acquired certifications in a CSV file and settings in YAML files inside
//! a single data directory.

pub mod csv;
pub mod traits;

pub use self::csv::CsvConnection;
pub use traits::{CertificationStorage, CheckpointStorage, NotificationSettingsStorage};
