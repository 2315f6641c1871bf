//! Plain-text rendering of service responses for the terminal.

use shared::{
    format_allowance, CatalogEntry, CertificationSummary, CertificationView, DailyCheckResponse,
    DeliveryOutcome, ExpiryTier, NotificationSettings, PermissionState,
};
use std::fmt::Write;

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn tier_marker(tier: ExpiryTier) -> &'static str {
    match tier {
        ExpiryTier::Expired => "!!",
        ExpiryTier::Expiring => "! ",
        ExpiryTier::Normal => "  ",
    }
}

pub fn catalog(entries: &[CatalogEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let definition = &entry.definition;
        let _ = writeln!(
            out,
            "[{}] {:<6} {:<45} {:<13} {:>8}  {} years",
            if entry.acquired { "x" } else { " " },
            definition.id,
            definition.name,
            definition.category,
            format_allowance(definition.allowance),
            definition.valid_years,
        );
    }
    out
}

pub fn certification_list(views: &[CertificationView]) -> String {
    if views.is_empty() {
        return "No certifications registered\n".to_string();
    }

    let mut out = String::new();
    for view in views {
        let _ = writeln!(
            out,
            "{} {:<6} {:<45} acquired {}  expires {}  {:>8}  {}",
            tier_marker(view.tier),
            view.cert_id,
            view.name,
            view.acquired_date,
            view.expiry_date,
            format_allowance(view.allowance),
            view.status_message,
        );
    }
    out
}

pub fn summary(summary: &CertificationSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Monthly allowance: {}", summary.formatted_total);
    let _ = writeln!(out, "Certifications:    {}", summary.certification_count);
    let _ = writeln!(out, "Needs attention:   {}", summary.attention_count);
    for alert in &summary.alerts {
        let _ = writeln!(out, "  - {}", alert);
    }
    out
}

pub fn settings(settings: &NotificationSettings) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Notifications:  {}", on_off(settings.enabled));
    let _ = writeln!(
        out,
        "Salary day:     {} (day {})",
        on_off(settings.salary_day_enabled),
        settings.salary_day
    );
    let _ = writeln!(out, "Renewals:       {}", on_off(settings.renewal_enabled));
    let _ = writeln!(out, "Daily check:    {}", on_off(settings.daily_check_enabled));
    out
}

pub fn daily_check(response: &DailyCheckResponse) -> String {
    if !response.ran {
        return format!("Daily check for {} already done or disabled\n", response.date);
    }

    let mut out = format!(
        "Daily check for {}: {} notification(s)\n",
        response.date,
        response.notifications.len()
    );
    for notification in &response.notifications {
        if !notification.outcome.is_success() {
            let _ = writeln!(
                out,
                "  not delivered: {} ({})",
                notification.event.title,
                delivery_outcome(&notification.outcome)
            );
        }
    }
    out
}

pub fn delivery_outcome(outcome: &DeliveryOutcome) -> String {
    match outcome {
        DeliveryOutcome::Delivered => "delivered".to_string(),
        DeliveryOutcome::Scheduled => "scheduled".to_string(),
        DeliveryOutcome::PermissionDenied => "permission denied".to_string(),
        DeliveryOutcome::Unsupported => "notifications unsupported".to_string(),
        DeliveryOutcome::Failed(reason) => format!("failed: {}", reason),
    }
}

pub fn permission(state: PermissionState) -> String {
    format!("Notification permission: {}\n", state.description())
}
