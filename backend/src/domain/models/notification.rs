//! Domain model for the once-per-day notification checkpoint.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Last calendar date on which the daily notification check ran
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationCheckpoint {
    pub last_checked: Option<NaiveDate>,
}

/// Per-day check state, derived from the checkpoint and today's date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyCheckState {
    NotChecked,
    Checked,
}

impl NotificationCheckpoint {
    pub fn state_for(&self, today: NaiveDate) -> DailyCheckState {
        match self.last_checked {
            Some(date) if date == today => DailyCheckState::Checked,
            _ => DailyCheckState::NotChecked,
        }
    }

    pub fn checked_on(today: NaiveDate) -> Self {
        Self {
            last_checked: Some(today),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid salary day: {0}. Must be 1-31")]
    InvalidSalaryDay(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_resets_on_new_day() {
        let monday = NaiveDate::from_ymd_opt(2025, 7, 7).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 7, 8).unwrap();

        let checkpoint = NotificationCheckpoint::default();
        assert_eq!(checkpoint.state_for(monday), DailyCheckState::NotChecked);

        let checkpoint = NotificationCheckpoint::checked_on(monday);
        assert_eq!(checkpoint.state_for(monday), DailyCheckState::Checked);
        assert_eq!(checkpoint.state_for(tuesday), DailyCheckState::NotChecked);
    }
}
