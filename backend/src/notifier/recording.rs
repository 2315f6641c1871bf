//! In-memory notifier for service tests.

use chrono::NaiveDateTime;
use shared::{DeliveryOutcome, NotificationEvent, PermissionState};
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::NotificationCapability;

/// Records every delivery and alarm instead of showing anything
pub struct RecordingNotifier {
    permission: Mutex<PermissionState>,
    granted_on_request: bool,
    delivered: Mutex<Vec<NotificationEvent>>,
    scheduled: Mutex<BTreeMap<u32, (NotificationEvent, NaiveDateTime)>>,
}

impl RecordingNotifier {
    pub fn granted() -> Self {
        Self::with_permission(PermissionState::Granted, true)
    }

    /// Starts without permission; `request_permission` grants it only if `grant` is true
    pub fn with_permission(permission: PermissionState, grant: bool) -> Self {
        Self {
            permission: Mutex::new(permission),
            granted_on_request: grant,
            delivered: Mutex::new(Vec::new()),
            scheduled: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn delivered(&self) -> Vec<NotificationEvent> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn scheduled(&self) -> BTreeMap<u32, (NotificationEvent, NaiveDateTime)> {
        self.scheduled.lock().unwrap().clone()
    }
}

impl NotificationCapability for RecordingNotifier {
    fn permission(&self) -> PermissionState {
        *self.permission.lock().unwrap()
    }

    fn request_permission(&self) -> PermissionState {
        let mut permission = self.permission.lock().unwrap();
        if *permission == PermissionState::NotRequested {
            *permission = if self.granted_on_request {
                PermissionState::Granted
            } else {
                PermissionState::Denied
            };
        }
        *permission
    }

    fn deliver(&self, event: &NotificationEvent) -> DeliveryOutcome {
        match self.permission() {
            PermissionState::Granted => {
                self.delivered.lock().unwrap().push(event.clone());
                DeliveryOutcome::Delivered
            }
            PermissionState::Unsupported => DeliveryOutcome::Unsupported,
            _ => DeliveryOutcome::PermissionDenied,
        }
    }

    fn schedule_at(&self, id: u32, event: &NotificationEvent, at: NaiveDateTime) -> DeliveryOutcome {
        match self.permission() {
            PermissionState::Granted => {
                self.scheduled.lock().unwrap().insert(id, (event.clone(), at));
                DeliveryOutcome::Scheduled
            }
            PermissionState::Unsupported => DeliveryOutcome::Unsupported,
            _ => DeliveryOutcome::PermissionDenied,
        }
    }

    fn cancel(&self, id: u32) -> bool {
        self.scheduled.lock().unwrap().remove(&id).is_some()
    }
}
