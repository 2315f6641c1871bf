//! Notification eligibility policy.
//!
//! Decides which notification events should fire for a given day. Delivery
//! is not done here; callers hand the returned events to a
//! [`NotificationCapability`](crate::notifier::NotificationCapability).
//!
//! The daily check runs at most once per calendar day. The checkpoint is
//! passed in and the advanced checkpoint is returned, so callers own
//! persistence.
//!
//! Renewal reminders are exact-match: an event fires only on the day the
//! remaining days equal the renewal window, 30, 7, 1 or 0. A day on which no
//! check ran is not caught up later.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use shared::{
    format_allowance, AcquiredCertification, CertificationDefinition, NotificationEvent,
    NotificationSettings, NotificationSource,
};

use crate::domain::catalog::CertificationCatalog;
use crate::domain::expiry_policy::days_until_expiry;
use crate::domain::models::notification::{DailyCheckState, NotificationCheckpoint};

/// Fixed reminder days counted back from expiry, besides the renewal window itself
pub const REMINDER_DAYS: [i64; 4] = [30, 7, 1, 0];

/// Result of one daily check evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct DailyCheckOutcome {
    pub events: Vec<NotificationEvent>,
    /// Checkpoint to persist
    pub checkpoint: NotificationCheckpoint,
    /// False when nothing was evaluated
    pub ran: bool,
}

pub fn salary_day_event(total_allowance: u32) -> NotificationEvent {
    NotificationEvent {
        title: "💰 Certification allowance this month".to_string(),
        body: format!("Certification allowance: {}", format_allowance(total_allowance)),
        source: NotificationSource::SalaryDay,
        cert_id: None,
    }
}

pub fn test_event() -> NotificationEvent {
    NotificationEvent {
        title: "🔔 Test notification".to_string(),
        body: "Notifications are working".to_string(),
        source: NotificationSource::Test,
        cert_id: None,
    }
}

pub fn evaluate_salary_day_trigger(
    settings: &NotificationSettings,
    today: NaiveDate,
    checkpoint: &NotificationCheckpoint,
    total_allowance: u32,
) -> Option<NotificationEvent> {
    let fires = settings.enabled
        && settings.salary_day_enabled
        && today.day() == settings.salary_day
        && checkpoint.state_for(today) == DailyCheckState::NotChecked;

    fires.then(|| salary_day_event(total_allowance))
}

/// Which renewal reminder, if any, is due with `days_until_expiry` left
pub fn renewal_trigger_source(
    definition: &CertificationDefinition,
    days_until_expiry: i64,
) -> Option<NotificationSource> {
    if days_until_expiry == definition.renewal_window_days() {
        return Some(NotificationSource::RenewalWindowOpen);
    }
    match days_until_expiry {
        30 => Some(NotificationSource::OneMonthLeft),
        7 => Some(NotificationSource::OneWeekLeft),
        1 => Some(NotificationSource::OneDayLeft),
        0 => Some(NotificationSource::ExpiredToday),
        _ => None,
    }
}

fn renewal_event(
    definition: &CertificationDefinition,
    source: NotificationSource,
    days: i64,
) -> NotificationEvent {
    let (title, body) = match source {
        NotificationSource::RenewalWindowOpen => (
            "📝 Certification renewal",
            format!("{} can now be renewed ({} days left)", definition.name, days),
        ),
        NotificationSource::OneMonthLeft => (
            "📝 Certification renewal",
            format!("{} expires in one month ({} days left)", definition.name, days),
        ),
        NotificationSource::OneWeekLeft => (
            "📝 Certification renewal",
            format!("{} expires in one week ({} days left)", definition.name, days),
        ),
        NotificationSource::OneDayLeft => (
            "📝 Certification renewal",
            format!("{} expires tomorrow ({} day left)", definition.name, days),
        ),
        _ => (
            "⚠️ Certification expires today",
            format!("{} is valid until today ({} days left)", definition.name, days),
        ),
    };

    NotificationEvent {
        title: title.to_string(),
        body,
        source,
        cert_id: Some(definition.id.clone()),
    }
}

/// Renewal reminder events due today, one per matching certification
pub fn evaluate_renewal_triggers(
    acquired: &[AcquiredCertification],
    catalog: &CertificationCatalog,
    today: NaiveDate,
) -> Vec<NotificationEvent> {
    acquired
        .iter()
        .filter_map(|certification| {
            let definition = catalog.find(&certification.cert_id)?;
            let days = days_until_expiry(certification.expiry_date, today);
            renewal_trigger_source(definition, days)
                .map(|source| renewal_event(definition, source, days))
        })
        .collect()
}

/// Evaluate every trigger for `today`, at most once per day.
///
/// The salary-day trigger and the renewal check are both judged against the
/// checkpoint state on entry; the checkpoint advances if either ran.
pub fn run_daily_check(
    settings: &NotificationSettings,
    acquired: &[AcquiredCertification],
    catalog: &CertificationCatalog,
    total_allowance: u32,
    today: NaiveDate,
    checkpoint: &NotificationCheckpoint,
) -> DailyCheckOutcome {
    if !settings.enabled {
        return DailyCheckOutcome {
            events: Vec::new(),
            checkpoint: checkpoint.clone(),
            ran: false,
        };
    }

    let mut events = Vec::new();
    let mut ran = false;

    if let Some(event) = evaluate_salary_day_trigger(settings, today, checkpoint, total_allowance) {
        events.push(event);
        ran = true;
    }

    if settings.daily_check_enabled && checkpoint.state_for(today) == DailyCheckState::NotChecked {
        if settings.renewal_enabled {
            events.extend(evaluate_renewal_triggers(acquired, catalog, today));
        }
        ran = true;
    }

    let checkpoint = if ran {
        NotificationCheckpoint::checked_on(today)
    } else {
        checkpoint.clone()
    };

    DailyCheckOutcome {
        events,
        checkpoint,
        ran,
    }
}

/// Next salary-day reminder strictly after `now`, at `reminder_hour` o'clock.
///
/// Months without the configured day (e.g. the 31st in April) are skipped.
pub fn next_salary_reminder(
    salary_day: u32,
    reminder_hour: u32,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    if !NotificationSettings::is_valid_salary_day(salary_day) {
        return None;
    }
    let first_of_month = now.date().with_day(1)?;

    // Every day 1-31 occurs at least once in any 12 consecutive months
    (0..=12).find_map(|offset| {
        let month = first_of_month.checked_add_months(Months::new(offset))?;
        let candidate = month
            .with_day(salary_day)?
            .and_hms_opt(reminder_hour, 0, 0)?;
        (candidate > now).then_some(candidate)
    })
}
