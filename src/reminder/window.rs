use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";
pub const START_TIME_FORMAT: &str = "%I:%M %p";

/// Timing of the reminder loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSettings {
    /// How long before the task start the reminder window opens.
    pub lead: Duration,
    /// Width of the half-open acceptance window.
    pub window: Duration,
    pub poll_interval: Duration,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        ReminderSettings {
            lead: Duration::from_secs(5 * 60),
            window: Duration::from_secs(60),
            poll_interval: Duration::from_secs(30),
        }
    }
}

impl ReminderSettings {
    /// `None` when the lead reaches outside the representable calendar.
    pub fn reminder_instant(&self, start: NaiveDateTime) -> Option<NaiveDateTime> {
        start.checked_sub_signed(to_chrono(self.lead)?)
    }

    /// `reminder <= now < reminder + window`
    pub fn is_due(&self, start: NaiveDateTime, now: NaiveDateTime) -> bool {
        let Some(reminder) = self.reminder_instant(start) else {
            return false;
        };
        match to_chrono(self.window).and_then(|window| reminder.checked_add_signed(window)) {
            Some(closes) => reminder <= now && now < closes,
            None => reminder <= now,
        }
    }

    pub fn lead_minutes(&self) -> u64 {
        self.lead.as_secs() / 60
    }
}

fn to_chrono(duration: Duration) -> Option<chrono::Duration> {
    i64::try_from(duration.as_secs()).ok().and_then(chrono::Duration::try_seconds)
}

/// Combines a `YYYY-MM-DD` due date and a 12-hour `hh:mm AM/PM` start time.
/// Returns `None` for anything else.
pub fn parse_task_start(due_date: &str, start_time: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(due_date.trim(), DUE_DATE_FORMAT).ok()?;
    let time = parse_clock_time(start_time)?;
    Some(date.and_time(time))
}

pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), START_TIME_FORMAT).ok()
}

pub fn format_clock_time(time: NaiveTime) -> String {
    time.format(START_TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_parse_task_start() {
        assert_eq!(parse_task_start("2024-06-01", "09:00 AM"), Some(at("2024-06-01 09:00:00")));
        assert_eq!(parse_task_start("2024-06-01", "12:30 PM"), Some(at("2024-06-01 12:30:00")));
        assert_eq!(parse_task_start("2024-06-01", "12:05 AM"), Some(at("2024-06-01 00:05:00")));
        assert_eq!(parse_task_start("2024-06-01", "9:05 pm"), Some(at("2024-06-01 21:05:00")));
    }

    #[test]
    fn test_parse_task_start_rejects_other_formats() {
        assert_eq!(parse_task_start("2024-06-01", "25:99"), None);
        assert_eq!(parse_task_start("2024-06-01", "13:00 PM"), None);
        assert_eq!(parse_task_start("2024-06-01", "09:00"), None);
        assert_eq!(parse_task_start("01/06/2024", "09:00 AM"), None);
        assert_eq!(parse_task_start("", ""), None);
    }

    #[test]
    fn test_window_edges() {
        let settings = ReminderSettings::default();
        let start = parse_task_start("2024-06-01", "09:00 AM").unwrap();

        assert_eq!(settings.reminder_instant(start), Some(at("2024-06-01 08:55:00")));
        assert!(!settings.is_due(start, at("2024-06-01 08:54:59")));
        assert!(settings.is_due(start, at("2024-06-01 08:55:00")));
        assert!(settings.is_due(start, at("2024-06-01 08:55:59")));
        assert!(!settings.is_due(start, at("2024-06-01 08:56:00")));
        assert!(!settings.is_due(start, at("2024-06-01 08:56:01")));
    }

    #[test]
    fn test_custom_lead_and_window() {
        let settings = ReminderSettings {
            lead: Duration::from_secs(600),
            window: Duration::from_secs(120),
            ..ReminderSettings::default()
        };
        let start = at("2024-06-01 09:00:00");

        assert!(settings.is_due(start, at("2024-06-01 08:51:30")));
        assert!(!settings.is_due(start, at("2024-06-01 08:52:00")));
        assert_eq!(settings.lead_minutes(), 10);
    }

    #[test]
    fn test_huge_durations_do_not_panic() {
        let start = at("2024-06-01 09:00:00");
        let huge_window = ReminderSettings {
            window: Duration::from_secs(10_000_000_000_000_000),
            ..ReminderSettings::default()
        };
        assert!(huge_window.is_due(start, at("2024-06-01 08:55:00")));
        assert!(!huge_window.is_due(start, at("2024-06-01 08:54:59")));

        let huge_lead = ReminderSettings {
            lead: Duration::from_secs(u64::MAX),
            ..ReminderSettings::default()
        };
        assert_eq!(huge_lead.reminder_instant(start), None);
        assert!(!huge_lead.is_due(start, at("2024-06-01 08:55:00")));
    }

    #[test]
    fn test_format_clock_time() {
        let time = parse_clock_time("07:10 PM").unwrap();
        assert_eq!(format_clock_time(time), "07:10 PM");
    }
}
