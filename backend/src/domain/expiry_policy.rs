//! Allowance and expiry policy.
//!
//! Pure functions over the catalog and the user's acquired certifications.
//! Nothing here reads the clock: `today` is always passed in.
//!
//! ## Rules
//!
//! - Days until expiry is the ceiling of the midnight-to-midnight difference
//! - Renewal window is 180 days for certifications valid 3+ years, else 60
//! - The attention window (90 days) only drives list filtering and alerts
//! - Expired certifications stop contributing to the allowance
//! - The monthly total is hard-capped at 100,000
//!
//! Acquired records whose id is missing from the catalog are skipped.

use chrono::{NaiveDate, NaiveTime};
use shared::{
    AcquiredCertification, CertificationDefinition, CertificationView, ExpiryStatus, ExpiryTier,
};

use crate::domain::catalog::CertificationCatalog;

/// Days-until-expiry threshold for the "needs attention" filter
pub const ATTENTION_WINDOW_DAYS: i64 = 90;

/// Ceiling on the monthly allowance total
pub const ALLOWANCE_CAP: u32 = 100_000;

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days from `today` to `expiry_date`, rounded up
pub fn days_until_expiry(expiry_date: NaiveDate, today: NaiveDate) -> i64 {
    let expiry = expiry_date.and_time(NaiveTime::MIN);
    let today = today.and_time(NaiveTime::MIN);
    let seconds = (expiry - today).num_seconds();

    // Integer division truncates toward zero, which is already the ceiling
    // for negative quotients.
    let days = seconds / SECONDS_PER_DAY;
    if seconds % SECONDS_PER_DAY > 0 {
        days + 1
    } else {
        days
    }
}

pub fn is_renewal_eligible(definition: &CertificationDefinition, days_until_expiry: i64) -> bool {
    days_until_expiry <= definition.renewal_window_days()
}

pub fn classify_expiry_status(
    definition: &CertificationDefinition,
    days_until_expiry: i64,
) -> ExpiryStatus {
    if days_until_expiry < 0 {
        ExpiryStatus::Expired {
            days_overdue: -days_until_expiry,
        }
    } else if days_until_expiry == 0 {
        ExpiryStatus::DueToday
    } else if is_renewal_eligible(definition, days_until_expiry) {
        ExpiryStatus::RenewalEligible {
            days_remaining: days_until_expiry,
        }
    } else {
        ExpiryStatus::Normal {
            days_remaining: days_until_expiry,
        }
    }
}

pub fn expiry_tier(days_until_expiry: i64) -> ExpiryTier {
    if days_until_expiry < 0 {
        ExpiryTier::Expired
    } else if days_until_expiry <= ATTENTION_WINDOW_DAYS {
        ExpiryTier::Expiring
    } else {
        ExpiryTier::Normal
    }
}

pub fn needs_attention(days_until_expiry: i64) -> bool {
    days_until_expiry <= ATTENTION_WINDOW_DAYS
}

/// Acquired certifications inside the attention window, in input order
pub fn select_attention_set<'a>(
    acquired: &'a [AcquiredCertification],
    catalog: &CertificationCatalog,
    today: NaiveDate,
) -> Vec<&'a AcquiredCertification> {
    acquired
        .iter()
        .filter(|certification| catalog.contains(&certification.cert_id))
        .filter(|certification| needs_attention(days_until_expiry(certification.expiry_date, today)))
        .collect()
}

/// Capped sum of allowances of the unexpired acquired certifications
pub fn compute_total_allowance(
    acquired: &[AcquiredCertification],
    catalog: &CertificationCatalog,
    today: NaiveDate,
) -> u32 {
    let total: u64 = acquired
        .iter()
        .filter_map(|certification| {
            let definition = catalog.find(&certification.cert_id)?;
            (days_until_expiry(certification.expiry_date, today) >= 0)
                .then_some(u64::from(definition.allowance))
        })
        .sum();

    total.min(u64::from(ALLOWANCE_CAP)) as u32
}

/// Join an acquired record with its definition and today's status
pub fn build_certification_view(
    certification: &AcquiredCertification,
    definition: &CertificationDefinition,
    today: NaiveDate,
) -> CertificationView {
    let days = days_until_expiry(certification.expiry_date, today);
    let status = classify_expiry_status(definition, days);

    CertificationView {
        cert_id: certification.cert_id.clone(),
        name: definition.name.clone(),
        category: definition.category.clone(),
        allowance: definition.allowance,
        acquired_date: certification.acquired_date,
        expiry_date: certification.expiry_date,
        days_until_expiry: days,
        status,
        status_message: status.to_string(),
        tier: expiry_tier(days),
    }
}
