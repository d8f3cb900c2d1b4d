use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::reminder::window::parse_task_start;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(TaskStatus::Pending),
            "Completed" => Ok(TaskStatus::Completed),
            other => Err(format!("unknown task status '{}'", other)),
        }
    }
}

// Row of the tasks table. Times are stored as entered ("09:05 AM").
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub due_date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: String,
    pub completed_at: Option<String>,
}

/// Where a pending task stands against the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskTiming {
    Upcoming,
    Ongoing,
    Delayed,
}

impl Task {
    pub fn status(&self) -> Option<TaskStatus> {
        self.status.parse().ok()
    }

    /// `None` for completed tasks and for tasks whose date or times do not parse.
    pub fn timing(&self, now: NaiveDateTime) -> Option<TaskTiming> {
        if self.status() != Some(TaskStatus::Pending) {
            return None;
        }
        let start = parse_task_start(&self.due_date, self.start_time.as_deref()?)?;
        let end = parse_task_start(&self.due_date, self.end_time.as_deref()?)?;

        let timing = match start.date().cmp(&now.date()) {
            Ordering::Less => TaskTiming::Delayed,
            Ordering::Greater => TaskTiming::Upcoming,
            Ordering::Equal if now < start => TaskTiming::Upcoming,
            Ordering::Equal if now <= end => TaskTiming::Ongoing,
            Ordering::Equal => TaskTiming::Delayed,
        };
        Some(timing)
    }
}

/// A pending task joined with its owner's email address, as read by the
/// reminder scheduler.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PendingReminder {
    pub id: i64,
    pub title: String,
    pub due_date: String,
    pub start_time: Option<String>,
    pub email: String,
}

pub struct NewTask {
    pub user_id: i64,
    pub title: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub due_date: String,
    pub start_time: String,
    pub end_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_column_text() {
        assert_eq!("Pending".parse::<TaskStatus>(), Ok(TaskStatus::Pending));
        assert_eq!(TaskStatus::Completed.to_string(), "Completed");
        assert!("pending".parse::<TaskStatus>().is_err());
    }

    fn pending(due_date: &str, start: &str, end: &str) -> Task {
        Task {
            id: 1,
            user_id: 1,
            title: "Gym".to_string(),
            category: None,
            priority: None,
            due_date: due_date.to_string(),
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
            status: "Pending".to_string(),
            completed_at: None,
        }
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_timing_against_the_clock() {
        let task = pending("2024-06-01", "09:00 AM", "10:00 AM");

        assert_eq!(task.timing(at("2024-05-31 23:00:00")), Some(TaskTiming::Upcoming));
        assert_eq!(task.timing(at("2024-06-01 08:59:59")), Some(TaskTiming::Upcoming));
        assert_eq!(task.timing(at("2024-06-01 09:00:00")), Some(TaskTiming::Ongoing));
        assert_eq!(task.timing(at("2024-06-01 10:00:00")), Some(TaskTiming::Ongoing));
        assert_eq!(task.timing(at("2024-06-01 10:00:01")), Some(TaskTiming::Delayed));
        assert_eq!(task.timing(at("2024-06-02 00:00:00")), Some(TaskTiming::Delayed));
    }

    #[test]
    fn test_timing_absent_for_completed_or_unreadable() {
        let now = at("2024-06-01 09:30:00");

        let completed = Task {
            status: "Completed".to_string(),
            ..pending("2024-06-01", "09:00 AM", "10:00 AM")
        };
        assert_eq!(completed.timing(now), None);
        assert_eq!(pending("2024-06-01", "25:99", "10:00 AM").timing(now), None);
        assert_eq!(
            Task {
                end_time: None,
                ..pending("2024-06-01", "09:00 AM", "10:00 AM")
            }
            .timing(now),
            None
        );
    }
}
