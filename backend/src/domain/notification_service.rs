//! Notification service: settings, the once-a-day check and alarms.
//!
//! The policy functions decide what fires. This service loads the inputs
//! from storage, hands fired events to the notifier and persists the
//! advanced checkpoint.

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use log::{info, warn};
use std::sync::Arc;

use crate::domain::certification_service::CertificationService;
use crate::domain::expiry_policy::compute_total_allowance;
use crate::domain::models::notification::{DailyCheckState, SettingsError};
use crate::domain::notification_policy::{
    next_salary_reminder, run_daily_check, salary_day_event, test_event,
};
use crate::notifier::{
    NotificationCapability, KNOWN_NOTIFICATION_IDS, SALARY_DAY_NOTIFICATION_ID,
};
use crate::storage::csv::{GlobalConfigRepository, NotificationSettingsRepository};
use crate::storage::{CheckpointStorage, CsvConnection, NotificationSettingsStorage};
use shared::{
    DailyCheckResponse, DeliveredNotification, DeliveryOutcome, NotificationSettings,
    NotificationSource, PermissionState, UpdateNotificationSettingsRequest, UpdateNotificationSettingsResponse,
};

/// What one `watch` iteration did
#[derive(Debug, Clone, PartialEq)]
pub struct WatchTick {
    pub check: DailyCheckResponse,
    /// Salary-day alarm armed after this tick
    pub salary_reminder: Option<NaiveDateTime>,
}

#[derive(Clone)]
pub struct NotificationService {
    settings_repository: NotificationSettingsRepository,
    checkpoint_repository: GlobalConfigRepository,
    certification_service: CertificationService,
    notifier: Arc<dyn NotificationCapability>,
}

impl NotificationService {
    pub fn new(
        connection: CsvConnection,
        certification_service: CertificationService,
        notifier: Arc<dyn NotificationCapability>,
    ) -> Self {
        Self {
            settings_repository: NotificationSettingsRepository::new(connection.clone()),
            checkpoint_repository: GlobalConfigRepository::new(connection),
            certification_service,
            notifier,
        }
    }

    pub fn get_settings(&self) -> Result<NotificationSettings> {
        self.settings_repository.get_settings()
    }

    /// Apply the fields present in `request` and persist the result.
    ///
    /// Turning notifications on asks the platform for permission.
    pub fn update_settings(
        &self,
        request: UpdateNotificationSettingsRequest,
    ) -> Result<UpdateNotificationSettingsResponse> {
        info!("Updating notification settings: {:?}", request);

        if let Some(day) = request.salary_day {
            if !NotificationSettings::is_valid_salary_day(day) {
                return Err(SettingsError::InvalidSalaryDay(day).into());
            }
        }

        let mut settings = self.settings_repository.get_settings()?;
        let was_enabled = settings.enabled;

        if let Some(enabled) = request.enabled {
            settings.enabled = enabled;
        }
        if let Some(salary_day_enabled) = request.salary_day_enabled {
            settings.salary_day_enabled = salary_day_enabled;
        }
        if let Some(salary_day) = request.salary_day {
            settings.salary_day = salary_day;
        }
        if let Some(renewal_enabled) = request.renewal_enabled {
            settings.renewal_enabled = renewal_enabled;
        }
        if let Some(daily_check_enabled) = request.daily_check_enabled {
            settings.daily_check_enabled = daily_check_enabled;
        }

        self.settings_repository.store_settings(&settings)?;

        let mut success_message = "Notification settings saved".to_string();
        if settings.enabled && !was_enabled {
            let permission = self.notifier.request_permission();
            if permission != PermissionState::Granted {
                warn!("Notifications enabled but permission is {:?}", permission);
                success_message = format!(
                    "{} (notifications {})",
                    success_message,
                    permission.description()
                );
            }
        }

        Ok(UpdateNotificationSettingsResponse {
            settings,
            success_message,
        })
    }

    pub fn permission_status(&self) -> PermissionState {
        self.notifier.permission()
    }

    pub fn request_permission(&self) -> PermissionState {
        let permission = self.notifier.request_permission();
        info!("Notification permission: {:?}", permission);
        permission
    }

    /// Run the daily check for `today` and deliver whatever fires.
    ///
    /// Safe to call repeatedly: after the first run of a day nothing fires
    /// again until the date changes.
    pub fn run_daily_check(&self, today: NaiveDate) -> Result<DailyCheckResponse> {
        self.check_and_deliver(today, false)
    }

    /// One `watch` iteration at `now`: the daily check, then the salary alarm.
    ///
    /// `armed` is the alarm left by the previous tick. While it falls on today
    /// the salary notice is left to the alarm, and the check only covers
    /// renewals.
    pub fn run_watch_tick(
        &self,
        now: NaiveDateTime,
        reminder_hour: u32,
        armed: Option<NaiveDateTime>,
    ) -> Result<WatchTick> {
        let today = now.date();
        let alarm_covers_today = armed.is_some_and(|at| at.date() == today);

        let check = self.check_and_deliver(today, alarm_covers_today)?;
        let salary_reminder = self.schedule_salary_reminder(now, reminder_hour, armed)?;

        Ok(WatchTick {
            check,
            salary_reminder,
        })
    }

    fn check_and_deliver(
        &self,
        today: NaiveDate,
        salary_alarm_armed: bool,
    ) -> Result<DailyCheckResponse> {
        let settings = self.settings_repository.get_settings()?;
        let checkpoint = self.checkpoint_repository.get_checkpoint()?;
        let acquired = self.certification_service.list_acquired()?;
        let catalog = self.certification_service.catalog();
        let total_allowance = compute_total_allowance(&acquired, catalog, today);

        let outcome = run_daily_check(
            &settings,
            &acquired,
            catalog,
            total_allowance,
            today,
            &checkpoint,
        );

        // The checkpoint is stored before any event is delivered
        if outcome.ran {
            self.checkpoint_repository.store_checkpoint(&outcome.checkpoint)?;
        }

        let notifications: Vec<DeliveredNotification> = outcome
            .events
            .into_iter()
            .filter(|event| !(salary_alarm_armed && event.source == NotificationSource::SalaryDay))
            .map(|event| {
                let delivery = self.notifier.deliver(&event);
                if !delivery.is_success() {
                    warn!("Notification '{}' not delivered: {:?}", event.title, delivery);
                }
                DeliveredNotification {
                    event,
                    outcome: delivery,
                }
            })
            .collect();

        if outcome.ran {
            info!(
                "Daily check for {} fired {} notification(s)",
                today,
                notifications.len()
            );
        }

        Ok(DailyCheckResponse {
            date: today,
            ran: outcome.ran,
            notifications,
        })
    }

    pub fn send_test_notification(&self) -> DeliveryOutcome {
        let outcome = self.notifier.deliver(&test_event());
        info!("Test notification: {:?}", outcome);
        outcome
    }

    /// Arm the salary-day alarm for the next reminder after `now`.
    ///
    /// `armed` is the alarm currently set, if any; it is kept when it is
    /// still the next reminder. A new alarm is never set on a day whose daily
    /// check already ran, since that check has decided the salary notice.
    /// Returns the armed time, or `None` when salary-day notifications are
    /// off or the notifier refused.
    pub fn schedule_salary_reminder(
        &self,
        now: NaiveDateTime,
        reminder_hour: u32,
        armed: Option<NaiveDateTime>,
    ) -> Result<Option<NaiveDateTime>> {
        let settings = self.settings_repository.get_settings()?;
        if !(settings.enabled && settings.salary_day_enabled) {
            self.notifier.cancel(SALARY_DAY_NOTIFICATION_ID);
            return Ok(None);
        }

        let checkpoint = self.checkpoint_repository.get_checkpoint()?;
        let next = match next_salary_reminder(settings.salary_day, reminder_hour, now) {
            Some(at)
                if armed != Some(at)
                    && checkpoint.state_for(at.date()) == DailyCheckState::Checked =>
            {
                at.date()
                    .and_hms_opt(23, 59, 59)
                    .and_then(|end_of_day| {
                        next_salary_reminder(settings.salary_day, reminder_hour, end_of_day)
                    })
            }
            next => next,
        };

        let at = match next {
            Some(at) => at,
            None => {
                warn!("No upcoming salary day {} found", settings.salary_day);
                self.notifier.cancel(SALARY_DAY_NOTIFICATION_ID);
                return Ok(None);
            }
        };

        if armed == Some(at) {
            return Ok(Some(at));
        }

        self.notifier.cancel(SALARY_DAY_NOTIFICATION_ID);
        let total_allowance = self.certification_service.total_allowance(at.date())?;
        let event = salary_day_event(total_allowance);

        match self.notifier.schedule_at(SALARY_DAY_NOTIFICATION_ID, &event, at) {
            DeliveryOutcome::Scheduled => Ok(Some(at)),
            outcome => {
                warn!("Salary reminder not scheduled: {:?}", outcome);
                Ok(None)
            }
        }
    }

    /// Cancel every alarm this application schedules
    pub fn cancel_all(&self) {
        for id in KNOWN_NOTIFICATION_IDS {
            self.notifier.cancel(id);
        }
        info!("Cancelled all scheduled notifications");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::CertificationCatalog;
    use crate::notifier::recording::RecordingNotifier;
    use crate::notifier::TEST_NOTIFICATION_ID;
    use crate::storage::csv::test_utils::TestEnvironment;
    use shared::{AddCertificationRequest, NotificationEvent};
    use std::sync::Mutex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup_with(
        notifier: RecordingNotifier,
    ) -> (TestEnvironment, NotificationService, Arc<RecordingNotifier>) {
        let env = TestEnvironment::new().expect("Failed to create test environment");
        let certification_service = CertificationService::new(
            env.connection.clone(),
            Arc::new(CertificationCatalog::builtin()),
        );
        let notifier = Arc::new(notifier);
        let service = NotificationService::new(
            env.connection.clone(),
            certification_service,
            notifier.clone(),
        );
        (env, service, notifier)
    }

    fn setup_test() -> (TestEnvironment, NotificationService, Arc<RecordingNotifier>) {
        setup_with(RecordingNotifier::granted())
    }

    fn enable_all(service: &NotificationService, salary_day: u32) {
        service
            .update_settings(UpdateNotificationSettingsRequest {
                enabled: Some(true),
                salary_day_enabled: Some(true),
                salary_day: Some(salary_day),
                renewal_enabled: Some(true),
                daily_check_enabled: Some(true),
            })
            .unwrap();
    }

    fn add(service: &NotificationService, cert_id: &str, acquired_date: NaiveDate) {
        service
            .certification_service
            .add_certification(AddCertificationRequest {
                cert_id: cert_id.to_string(),
                acquired_date,
            })
            .unwrap();
    }

    #[test]
    fn test_update_settings_partial() {
        let (_env, service, _notifier) = setup_test();

        let response = service
            .update_settings(UpdateNotificationSettingsRequest {
                salary_day: Some(10),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(response.settings.salary_day, 10);
        assert!(!response.settings.enabled);
        assert_eq!(service.get_settings().unwrap(), response.settings);
    }

    #[test]
    fn test_update_settings_rejects_invalid_salary_day() {
        let (_env, service, _notifier) = setup_test();

        for day in [0, 32] {
            let err = service
                .update_settings(UpdateNotificationSettingsRequest {
                    salary_day: Some(day),
                    enabled: Some(true),
                    ..Default::default()
                })
                .unwrap_err();
            assert_eq!(
                err.downcast_ref::<SettingsError>(),
                Some(&SettingsError::InvalidSalaryDay(day))
            );
        }

        assert_eq!(service.get_settings().unwrap(), NotificationSettings::default());
    }

    #[test]
    fn test_enabling_requests_permission() {
        let (_env, service, notifier) =
            setup_with(RecordingNotifier::with_permission(PermissionState::NotRequested, false));

        let response = service
            .update_settings(UpdateNotificationSettingsRequest {
                enabled: Some(true),
                ..Default::default()
            })
            .unwrap();

        assert!(response.settings.enabled);
        assert_eq!(notifier.permission(), PermissionState::Denied);
        assert!(response.success_message.contains(PermissionState::Denied.description()));
    }

    #[test]
    fn test_daily_check_twice_same_day_only_first_fires() {
        let (_env, service, notifier) = setup_test();
        enable_all(&service, 25);
        add(&service, "pca", date(2024, 1, 1)); // expires 2026-01-01

        let today = date(2025, 12, 25); // salary day, 7 days before expiry

        let first = service.run_daily_check(today).unwrap();
        assert!(first.ran);
        let sources: Vec<NotificationSource> =
            first.notifications.iter().map(|n| n.event.source).collect();
        assert_eq!(
            sources,
            vec![NotificationSource::SalaryDay, NotificationSource::OneWeekLeft]
        );
        assert_eq!(
            first.notifications[0].event.body,
            "Certification allowance: ¥10,000"
        );

        let second = service.run_daily_check(today).unwrap();
        assert!(!second.ran);
        assert!(second.notifications.is_empty());
        assert_eq!(notifier.delivered().len(), 2);

        let next_day = service.run_daily_check(date(2025, 12, 26)).unwrap();
        assert!(next_day.ran);
        assert!(next_day.notifications.is_empty());
    }

    #[test]
    fn test_daily_check_disabled_does_nothing() {
        let (env, service, notifier) = setup_test();
        add(&service, "pca", date(2024, 1, 1));

        let response = service.run_daily_check(date(2025, 12, 25)).unwrap();

        assert!(!response.ran);
        assert!(notifier.delivered().is_empty());
        let checkpoint = GlobalConfigRepository::new(env.connection.clone())
            .get_checkpoint()
            .unwrap();
        assert_eq!(checkpoint.last_checked, None);
    }

    #[test]
    fn test_daily_check_reports_denied_delivery() {
        let (_env, service, notifier) =
            setup_with(RecordingNotifier::with_permission(PermissionState::NotRequested, false));
        enable_all(&service, 25);

        let response = service.run_daily_check(date(2025, 3, 25)).unwrap();

        assert!(response.ran);
        assert_eq!(response.notifications.len(), 1);
        assert_eq!(
            response.notifications[0].outcome,
            DeliveryOutcome::PermissionDenied
        );
        assert!(notifier.delivered().is_empty());
    }

    #[test]
    fn test_test_notification() {
        let (_env, service, notifier) = setup_test();

        assert_eq!(service.send_test_notification(), DeliveryOutcome::Delivered);
        assert_eq!(notifier.delivered()[0].source, NotificationSource::Test);
    }

    #[test]
    fn test_schedule_salary_reminder() {
        let (_env, service, notifier) = setup_test();
        enable_all(&service, 31);
        add(&service, "cka", date(2025, 1, 1));

        let now = date(2025, 4, 10).and_hms_opt(12, 0, 0).unwrap();
        let at = service.schedule_salary_reminder(now, 9, None).unwrap();

        let expected = date(2025, 5, 31).and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(at, Some(expected));
        let scheduled = notifier.scheduled();
        let (event, when) = scheduled.get(&SALARY_DAY_NOTIFICATION_ID).unwrap();
        assert_eq!(*when, expected);
        assert_eq!(event.body, "Certification allowance: ¥10,000");
    }

    #[test]
    fn test_schedule_salary_reminder_cancels_when_disabled() {
        let (_env, service, notifier) = setup_test();
        enable_all(&service, 25);
        let now = date(2025, 4, 10).and_hms_opt(12, 0, 0).unwrap();
        service.schedule_salary_reminder(now, 9, None).unwrap();
        assert!(notifier.scheduled().contains_key(&SALARY_DAY_NOTIFICATION_ID));

        service
            .update_settings(UpdateNotificationSettingsRequest {
                salary_day_enabled: Some(false),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(service.schedule_salary_reminder(now, 9, None).unwrap(), None);
        assert!(notifier.scheduled().is_empty());
    }

    #[test]
    fn test_cancel_all() {
        let (_env, service, notifier) = setup_test();
        let at = date(2025, 5, 1).and_hms_opt(9, 0, 0).unwrap();
        notifier.schedule_at(SALARY_DAY_NOTIFICATION_ID, &test_event(), at);
        notifier.schedule_at(TEST_NOTIFICATION_ID, &test_event(), at);

        service.cancel_all();

        assert!(notifier.scheduled().is_empty());
    }

    fn salary_deliveries(notifier: &RecordingNotifier) -> usize {
        notifier
            .delivered()
            .iter()
            .filter(|event| event.source == NotificationSource::SalaryDay)
            .count()
    }

    #[test]
    fn test_watch_tick_on_salary_day_fires_salary_notice_once() {
        let (_env, service, notifier) = setup_test();
        enable_all(&service, 25);
        let salary_day = date(2025, 3, 25);

        let first = service
            .run_watch_tick(salary_day.and_hms_opt(8, 0, 0).unwrap(), 9, None)
            .unwrap();
        let second = service
            .run_watch_tick(salary_day.and_hms_opt(8, 30, 0).unwrap(), 9, first.salary_reminder)
            .unwrap();
        let third = service
            .run_watch_tick(salary_day.and_hms_opt(10, 0, 0).unwrap(), 9, second.salary_reminder)
            .unwrap();

        assert_eq!(salary_deliveries(&notifier), 1);
        // The alarm never lands on the day the check already covered
        let next = date(2025, 4, 25).and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(first.salary_reminder, Some(next));
        assert_eq!(third.salary_reminder, Some(next));
        assert!(notifier
            .scheduled()
            .values()
            .all(|(_, at)| at.date() != salary_day));
    }

    #[test]
    fn test_watch_tick_leaves_salary_notice_to_armed_alarm() {
        let (_env, service, notifier) = setup_test();
        enable_all(&service, 25);
        let alarm = date(2025, 3, 25).and_hms_opt(9, 0, 0).unwrap();

        let eve = service
            .run_watch_tick(date(2025, 3, 24).and_hms_opt(22, 0, 0).unwrap(), 9, None)
            .unwrap();
        assert_eq!(eve.salary_reminder, Some(alarm));

        let morning = service
            .run_watch_tick(date(2025, 3, 25).and_hms_opt(0, 30, 0).unwrap(), 9, eve.salary_reminder)
            .unwrap();
        assert!(morning.check.ran);
        assert!(morning.check.notifications.is_empty());
        assert_eq!(morning.salary_reminder, Some(alarm));
        assert_eq!(notifier.scheduled().get(&SALARY_DAY_NOTIFICATION_ID).map(|(_, at)| *at), Some(alarm));

        let later = service
            .run_watch_tick(date(2025, 3, 25).and_hms_opt(9, 30, 0).unwrap(), 9, morning.salary_reminder)
            .unwrap();
        assert!(!later.check.ran);
        assert_eq!(
            later.salary_reminder,
            Some(date(2025, 4, 25).and_hms_opt(9, 0, 0).unwrap())
        );
        assert_eq!(salary_deliveries(&notifier), 0);
    }

    #[test]
    fn test_alarm_skips_day_already_checked() {
        let (_env, service, notifier) = setup_test();
        enable_all(&service, 25);
        let today = date(2025, 3, 25);

        service.run_daily_check(today).unwrap();
        let at = service
            .schedule_salary_reminder(today.and_hms_opt(8, 0, 0).unwrap(), 9, None)
            .unwrap();

        assert_eq!(at, Some(date(2025, 4, 25).and_hms_opt(9, 0, 0).unwrap()));
        assert_eq!(salary_deliveries(&notifier), 1);
    }

    /// Records the stored checkpoint at the moment each event is delivered
    struct CheckpointObservingNotifier {
        checkpoints: GlobalConfigRepository,
        seen: Mutex<Vec<Option<NaiveDate>>>,
    }

    impl NotificationCapability for CheckpointObservingNotifier {
        fn permission(&self) -> PermissionState {
            PermissionState::Granted
        }

        fn request_permission(&self) -> PermissionState {
            PermissionState::Granted
        }

        fn deliver(&self, _event: &NotificationEvent) -> DeliveryOutcome {
            let checkpoint = self.checkpoints.get_checkpoint().unwrap();
            self.seen.lock().unwrap().push(checkpoint.last_checked);
            DeliveryOutcome::Delivered
        }

        fn schedule_at(&self, _id: u32, _event: &NotificationEvent, _at: NaiveDateTime) -> DeliveryOutcome {
            DeliveryOutcome::Scheduled
        }

        fn cancel(&self, _id: u32) -> bool {
            false
        }
    }

    #[test]
    fn test_checkpoint_is_stored_before_delivery() {
        let env = TestEnvironment::new().unwrap();
        let notifier = Arc::new(CheckpointObservingNotifier {
            checkpoints: GlobalConfigRepository::new(env.connection.clone()),
            seen: Mutex::new(Vec::new()),
        });
        let service = NotificationService::new(
            env.connection.clone(),
            CertificationService::new(
                env.connection.clone(),
                Arc::new(CertificationCatalog::builtin()),
            ),
            notifier.clone(),
        );
        enable_all(&service, 25);
        let today = date(2025, 3, 25);

        service.run_daily_check(today).unwrap();

        assert_eq!(*notifier.seen.lock().unwrap(), vec![Some(today)]);
    }
}
