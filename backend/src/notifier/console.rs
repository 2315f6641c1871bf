use chrono::{Local, NaiveDateTime};
use log::{debug, error, info, warn};
use shared::{DeliveryOutcome, NotificationEvent, PermissionState};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

use super::NotificationCapability;

type SharedOutput = Arc<Mutex<Box<dyn Write + Send>>>;

/// Terminal adapter: events are printed, alarms are tokio timers.
///
/// Scheduling needs a running tokio runtime; without one `schedule_at`
/// reports `Unsupported`. Pending alarms are aborted on drop.
pub struct ConsoleNotifier {
    output: SharedOutput,
    scheduled: Mutex<HashMap<u32, JoinHandle<()>>>,
}

impl ConsoleNotifier {
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            output: Arc::new(Mutex::new(writer)),
            scheduled: Mutex::new(HashMap::new()),
        }
    }

    /// Ids with an alarm that has not fired yet
    pub fn pending_ids(&self) -> Vec<u32> {
        let scheduled = self.scheduled.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<u32> = scheduled
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    fn write_event(output: &SharedOutput, event: &NotificationEvent) -> DeliveryOutcome {
        let mut writer = output.lock().unwrap_or_else(PoisonError::into_inner);
        let result = writeln!(writer, "{}\n  {}", event.title, event.body).and_then(|_| writer.flush());

        match result {
            Ok(()) => {
                info!("Delivered notification: {} - {}", event.title, event.body);
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                error!("Failed to write notification '{}': {}", event.title, e);
                DeliveryOutcome::Failed(e.to_string())
            }
        }
    }
}

impl NotificationCapability for ConsoleNotifier {
    fn permission(&self) -> PermissionState {
        PermissionState::Granted
    }

    fn request_permission(&self) -> PermissionState {
        PermissionState::Granted
    }

    fn deliver(&self, event: &NotificationEvent) -> DeliveryOutcome {
        Self::write_event(&self.output, event)
    }

    fn schedule_at(&self, id: u32, event: &NotificationEvent, at: NaiveDateTime) -> DeliveryOutcome {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("No async runtime available, cannot schedule notification {}", id);
                return DeliveryOutcome::Unsupported;
            }
        };

        // Times in the past fire immediately
        let delay = (at - Local::now().naive_local())
            .to_std()
            .unwrap_or(Duration::ZERO);

        let output = Arc::clone(&self.output);
        let event = event.clone();
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            Self::write_event(&output, &event);
        });

        let mut scheduled = self.scheduled.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = scheduled.insert(id, handle) {
            previous.abort();
            debug!("Replaced previously scheduled notification {}", id);
        }

        info!("Scheduled notification {} for {}", id, at);
        DeliveryOutcome::Scheduled
    }

    fn cancel(&self, id: u32) -> bool {
        let mut scheduled = self.scheduled.lock().unwrap_or_else(PoisonError::into_inner);
        match scheduled.remove(&id) {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                if pending {
                    info!("Cancelled scheduled notification {}", id);
                }
                pending
            }
            None => false,
        }
    }
}

impl Drop for ConsoleNotifier {
    fn drop(&mut self) {
        let scheduled = self.scheduled.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, handle) in scheduled.drain() {
            handle.abort();
        }
    }
}
