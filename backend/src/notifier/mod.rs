//! # Notification Delivery
//!
//! The notification policy only decides *what* should fire. Showing a
//! notification, or arming an alarm for later, is a platform effect behind
//! [`NotificationCapability`]. Adapters:
//!
//! - [`ConsoleNotifier`]: prints to the terminal, schedules with tokio timers
//! - [`DisabledNotifier`]: a platform without notification support
//!
//! Missing support or permission is reported through [`DeliveryOutcome`] and
//! [`PermissionState`], never as an error.

pub mod console;
pub mod disabled;

#[cfg(test)]
pub mod recording;

use chrono::NaiveDateTime;
use shared::{DeliveryOutcome, NotificationEvent, PermissionState};

pub use console::ConsoleNotifier;
pub use disabled::DisabledNotifier;

/// Alarm id of the salary-day reminder
pub const SALARY_DAY_NOTIFICATION_ID: u32 = 1;

/// Alarm id of the test notification
pub const TEST_NOTIFICATION_ID: u32 = 999;

/// Ids cancelled by `cancel_all`
pub const KNOWN_NOTIFICATION_IDS: [u32; 2] = [SALARY_DAY_NOTIFICATION_ID, TEST_NOTIFICATION_ID];

pub trait NotificationCapability: Send + Sync {
    /// Current permission without prompting
    fn permission(&self) -> PermissionState;

    /// Ask the platform for permission; returns the resulting state
    fn request_permission(&self) -> PermissionState;

    /// Show `event` now
    fn deliver(&self, event: &NotificationEvent) -> DeliveryOutcome;

    /// Show `event` at local time `at`, replacing anything already scheduled under `id`
    fn schedule_at(&self, id: u32, event: &NotificationEvent, at: NaiveDateTime) -> DeliveryOutcome;

    /// Cancel the alarm scheduled under `id`; returns whether one was pending
    fn cancel(&self, id: u32) -> bool;
}
