use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A certification the employer pays a monthly allowance for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationDefinition {
    /// Unique short code (e.g. "pca")
    pub id: String,
    /// Display name
    pub name: String,
    /// Grouping label (vendor or body)
    pub category: String,
    /// Monthly allowance in currency minor units
    pub allowance: u32,
    /// Validity period in years
    pub valid_years: u32,
}

impl CertificationDefinition {
    /// Days before expiry during which renewal is possible
    pub fn renewal_window_days(&self) -> i64 {
        if self.valid_years >= 3 {
            180
        } else {
            60
        }
    }
}

/// A certification the user has recorded as held
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquiredCertification {
    /// References `CertificationDefinition::id`
    pub cert_id: String,
    pub acquired_date: NaiveDate,
    /// Derived once at creation, never recomputed
    pub expiry_date: NaiveDate,
}

/// Expiry classification of an acquired certification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpiryStatus {
    Expired { days_overdue: i64 },
    DueToday,
    RenewalEligible { days_remaining: i64 },
    Normal { days_remaining: i64 },
}

impl fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiryStatus::Expired { days_overdue } => {
                write!(f, "{} days overdue (expired)", days_overdue)
            }
            ExpiryStatus::DueToday => write!(f, "due today"),
            ExpiryStatus::RenewalEligible { days_remaining } => {
                write!(f, "{} days left (renewal eligible)", days_remaining)
            }
            ExpiryStatus::Normal { days_remaining } => write!(f, "{} days left", days_remaining),
        }
    }
}

/// Visual tier used when rendering a certification card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpiryTier {
    /// Past the expiry date
    Expired,
    /// Inside the attention window but not yet expired
    Expiring,
    Normal,
}

/// Filter applied to the acquired-certifications list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CertificationFilter {
    #[default]
    All,
    /// Only certifications inside the attention window
    Expiring,
    /// Only certifications outside the attention window
    Valid,
}

impl FromStr for CertificationFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(CertificationFilter::All),
            "expiring" => Ok(CertificationFilter::Expiring),
            "valid" => Ok(CertificationFilter::Valid),
            other => Err(format!(
                "Unknown filter '{}'. Expected one of: all, expiring, valid",
                other
            )),
        }
    }
}

/// One acquired certification joined with its catalog definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificationView {
    pub cert_id: String,
    pub name: String,
    pub category: String,
    pub allowance: u32,
    pub acquired_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub days_until_expiry: i64,
    pub status: ExpiryStatus,
    pub status_message: String,
    pub tier: ExpiryTier,
}

/// Catalog row with an "already acquired" marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub definition: CertificationDefinition,
    pub acquired: bool,
}

/// Dashboard numbers shown above the certification list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificationSummary {
    /// Capped monthly allowance in currency minor units
    pub total_allowance: u32,
    pub formatted_total: String,
    pub certification_count: usize,
    /// Number of certifications inside the attention window
    pub attention_count: usize,
    /// "<name> - <status>" lines for the attention set
    pub alerts: Vec<String>,
}

/// User notification preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Master switch
    pub enabled: bool,
    pub salary_day_enabled: bool,
    /// Day of month (1-31)
    pub salary_day: u32,
    pub renewal_enabled: bool,
    pub daily_check_enabled: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            salary_day_enabled: false,
            salary_day: 25,
            renewal_enabled: false,
            daily_check_enabled: true,
        }
    }
}

impl NotificationSettings {
    pub fn is_valid_salary_day(day: u32) -> bool {
        (1..=31).contains(&day)
    }
}

/// Why a notification event fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationSource {
    SalaryDay,
    RenewalWindowOpen,
    OneMonthLeft,
    OneWeekLeft,
    OneDayLeft,
    ExpiredToday,
    /// Manually requested test notification
    Test,
}

/// A notification ready to be handed to a delivery capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub title: String,
    pub body: String,
    pub source: NotificationSource,
    /// Set for certification-related events
    pub cert_id: Option<String>,
}

/// Platform notification permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionState {
    Granted,
    Denied,
    /// Not asked yet
    NotRequested,
    /// Platform has no notification support
    Unsupported,
}

impl PermissionState {
    pub fn description(&self) -> &'static str {
        match self {
            PermissionState::Granted => "Notifications are allowed",
            PermissionState::Denied => "Notifications are blocked",
            PermissionState::NotRequested => "Notification permission has not been requested yet",
            PermissionState::Unsupported => "This platform does not support notifications",
        }
    }
}

/// Result of handing an event to a delivery capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryOutcome {
    Delivered,
    Scheduled,
    PermissionDenied,
    Unsupported,
    Failed(String),
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered | DeliveryOutcome::Scheduled)
    }
}

/// Request for adding an acquired certification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddCertificationRequest {
    pub cert_id: String,
    pub acquired_date: NaiveDate,
}

/// Response after adding an acquired certification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddCertificationResponse {
    pub certification: AcquiredCertification,
    pub success_message: String,
}

/// Response after removing an acquired certification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveCertificationResponse {
    pub removed: bool,
    pub success_message: String,
}

/// Partial update of notification settings; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateNotificationSettingsRequest {
    pub enabled: Option<bool>,
    pub salary_day_enabled: Option<bool>,
    pub salary_day: Option<u32>,
    pub renewal_enabled: Option<bool>,
    pub daily_check_enabled: Option<bool>,
}

/// Response after updating notification settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateNotificationSettingsResponse {
    pub settings: NotificationSettings,
    pub success_message: String,
}

/// One event together with what the delivery capability did with it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveredNotification {
    pub event: NotificationEvent,
    pub outcome: DeliveryOutcome,
}

/// Result of a daily notification check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCheckResponse {
    pub date: NaiveDate,
    /// False when the check was skipped (disabled or already ran today)
    pub ran: bool,
    pub notifications: Vec<DeliveredNotification>,
}

/// Format an amount in currency minor units with thousands separators, e.g. "¥10,000"
pub fn format_allowance(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("¥{}", grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(valid_years: u32) -> CertificationDefinition {
        CertificationDefinition {
            id: "test".to_string(),
            name: "Test Certification".to_string(),
            category: "Test".to_string(),
            allowance: 5000,
            valid_years,
        }
    }

    #[test]
    fn test_renewal_window_by_validity() {
        assert_eq!(definition(2).renewal_window_days(), 60);
        assert_eq!(definition(3).renewal_window_days(), 180);
        assert_eq!(definition(5).renewal_window_days(), 180);
        assert_eq!(definition(1).renewal_window_days(), 60);
    }

    #[test]
    fn test_expiry_status_messages() {
        assert_eq!(
            ExpiryStatus::Expired { days_overdue: 5 }.to_string(),
            "5 days overdue (expired)"
        );
        assert_eq!(ExpiryStatus::DueToday.to_string(), "due today");
        assert_eq!(
            ExpiryStatus::RenewalEligible { days_remaining: 42 }.to_string(),
            "42 days left (renewal eligible)"
        );
        assert_eq!(
            ExpiryStatus::Normal { days_remaining: 400 }.to_string(),
            "400 days left"
        );
    }

    #[test]
    fn test_default_notification_settings() {
        let settings = NotificationSettings::default();
        assert!(!settings.enabled);
        assert!(!settings.salary_day_enabled);
        assert_eq!(settings.salary_day, 25);
        assert!(!settings.renewal_enabled);
        assert!(settings.daily_check_enabled);
    }

    #[test]
    fn test_partial_settings_json_fills_defaults() {
        let settings: NotificationSettings =
            serde_json::from_str(r#"{"enabled": true, "salary_day": 10}"#).unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.salary_day, 10);
        assert!(settings.daily_check_enabled);
    }

    #[test]
    fn test_salary_day_validation() {
        assert!(!NotificationSettings::is_valid_salary_day(0));
        assert!(NotificationSettings::is_valid_salary_day(1));
        assert!(NotificationSettings::is_valid_salary_day(31));
        assert!(!NotificationSettings::is_valid_salary_day(32));
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<CertificationFilter>(), Ok(CertificationFilter::All));
        assert_eq!(
            "Expiring".parse::<CertificationFilter>(),
            Ok(CertificationFilter::Expiring)
        );
        assert_eq!("valid".parse::<CertificationFilter>(), Ok(CertificationFilter::Valid));
        assert!("soon".parse::<CertificationFilter>().is_err());
    }

    #[test]
    fn test_format_allowance() {
        assert_eq!(format_allowance(0), "¥0");
        assert_eq!(format_allowance(999), "¥999");
        assert_eq!(format_allowance(5000), "¥5,000");
        assert_eq!(format_allowance(100000), "¥100,000");
        assert_eq!(format_allowance(1234567), "¥1,234,567");
    }

    #[test]
    fn test_delivery_outcome_success() {
        assert!(DeliveryOutcome::Delivered.is_success());
        assert!(DeliveryOutcome::Scheduled.is_success());
        assert!(!DeliveryOutcome::PermissionDenied.is_success());
        assert!(!DeliveryOutcome::Unsupported.is_success());
        assert!(!DeliveryOutcome::Failed("boom".to_string()).is_success());
    }
}
