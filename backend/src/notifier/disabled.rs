use chrono::NaiveDateTime;
use log::debug;
use shared::{DeliveryOutcome, NotificationEvent, PermissionState};

use super::NotificationCapability;

/// Adapter for hosts without any notification support
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

impl NotificationCapability for DisabledNotifier {
    fn permission(&self) -> PermissionState {
        PermissionState::Unsupported
    }

    fn request_permission(&self) -> PermissionState {
        PermissionState::Unsupported
    }

    fn deliver(&self, event: &NotificationEvent) -> DeliveryOutcome {
        debug!("Notifications unsupported, skipping '{}'", event.title);
        DeliveryOutcome::Unsupported
    }

    fn schedule_at(&self, id: u32, _event: &NotificationEvent, _at: NaiveDateTime) -> DeliveryOutcome {
        debug!("Notifications unsupported, not scheduling id {}", id);
        DeliveryOutcome::Unsupported
    }

    fn cancel(&self, _id: u32) -> bool {
        false
    }
}
