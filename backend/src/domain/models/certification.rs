//! Domain model for acquired certifications.
use chrono::{Datelike, NaiveDate};
use shared::{AcquiredCertification, CertificationDefinition};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CertificationError {
    #[error("Certification '{0}' is already registered")]
    Duplicate(String),
    #[error("Unknown certification: {0}")]
    UnknownCertification(String),
    #[error("Certification '{0}' is not registered")]
    NotFound(String),
    #[error("Cannot compute an expiry date {valid_years} years after {acquired_date}")]
    InvalidExpiry {
        acquired_date: NaiveDate,
        valid_years: u32,
    },
}

/// Expiry date `valid_years` after `acquired_date`.
///
/// Feb 29 rolls over to Mar 1 when the target year is not a leap year.
pub fn derive_expiry_date(acquired_date: NaiveDate, valid_years: u32) -> Option<NaiveDate> {
    let year = acquired_date.year().checked_add(i32::try_from(valid_years).ok()?)?;
    acquired_date
        .with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

/// Build a new acquired record for `definition`, deriving the expiry date
pub fn new_acquired_certification(
    definition: &CertificationDefinition,
    acquired_date: NaiveDate,
) -> Result<AcquiredCertification, CertificationError> {
    let expiry_date = derive_expiry_date(acquired_date, definition.valid_years).ok_or(
        CertificationError::InvalidExpiry {
            acquired_date,
            valid_years: definition.valid_years,
        },
    )?;

    Ok(AcquiredCertification {
        cert_id: definition.id.clone(),
        acquired_date,
        expiry_date,
    })
}
