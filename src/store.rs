use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Timelike, Utc};
use log::debug;
use sqlx::SqlitePool;

use crate::error::{StoreError, TaskValidationError};
use crate::models::session::Session;
use crate::models::task::{NewTask, PendingReminder, Task, TaskStatus};
use crate::models::user::User;
use crate::reminder::window::{format_clock_time, parse_clock_time, DUE_DATE_FORMAT};

pub const DEFAULT_SNOOZE_MINUTES: i64 = 10;

/// Read side used by the reminder scheduler.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Every `Pending` task owned by `user_id`, joined with the owner's email.
    async fn pending_reminders(&self, user_id: i64) -> Result<Vec<PendingReminder>, StoreError>;

    /// Resolves a session id to its user, ignoring expired sessions.
    async fn user_for_session(&self, session_id: &str) -> Result<Option<i64>, StoreError>;
}

#[derive(Clone)]
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn pending_reminders(&self, user_id: i64) -> Result<Vec<PendingReminder>, StoreError> {
        let rows = sqlx::query_as::<_, PendingReminder>(
            "
            SELECT t.id, t.title, t.due_date, t.start_time, u.email
            FROM tasks t
            JOIN users u ON t.user_id = u.id
            WHERE t.user_id = ? AND t.status = ?
            ",
        )
        .bind(user_id)
        .bind(TaskStatus::Pending.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn user_for_session(&self, session_id: &str) -> Result<Option<i64>, StoreError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT session_id, user_id, expires_at FROM sessions WHERE session_id = ?",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session
            .filter(|s| s.expires_at > Utc::now())
            .map(|s| s.user_id))
    }
}

impl SqliteTaskStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteTaskStore { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn find_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT id, username, email FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn add_task(&self, task: &NewTask) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "
            INSERT INTO tasks
                (user_id, title, category, priority, due_date, start_time, end_time, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(task.user_id)
        .bind(&task.title)
        .bind(&task.category)
        .bind(&task.priority)
        .bind(&task.due_date)
        .bind(&task.start_time)
        .bind(&task.end_time)
        .bind(TaskStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn list_tasks(&self, user_id: i64) -> Result<Vec<Task>, StoreError> {
        let tasks = sqlx::query_as::<_, Task>(
            "
            SELECT id, user_id, title, category, priority, due_date,
                   start_time, end_time, status, completed_at
            FROM tasks
            WHERE user_id = ?
            ORDER BY due_date, id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    pub async fn mark_completed(&self, user_id: i64, task_id: i64) -> Result<(), StoreError> {
        let completed_at = Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S").to_string();
        let result = sqlx::query(
            "UPDATE tasks SET status = ?, completed_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(TaskStatus::Completed.as_str())
        .bind(completed_at)
        .bind(task_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::TaskNotFound(task_id));
        }
        Ok(())
    }

    pub async fn delete_task(&self, user_id: i64, task_id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(task_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::TaskNotFound(task_id));
        }
        Ok(())
    }

    /// Pushes the task's end time back by `minutes` and returns the new end time.
    /// Only the time of day is stored, so a snooze past midnight wraps.
    pub async fn snooze_task(&self, user_id: i64, task_id: i64, minutes: i64) -> Result<String, StoreError> {
        let row: Option<(String, Option<String>)> =
            sqlx::query_as("SELECT due_date, end_time FROM tasks WHERE id = ? AND user_id = ?")
                .bind(task_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        let (due_date, end_time) = row.ok_or(StoreError::TaskNotFound(task_id))?;
        let end_time = end_time.unwrap_or_default();

        let end = match (
            NaiveDate::parse_from_str(&due_date, DUE_DATE_FORMAT).ok(),
            parse_clock_time(&end_time),
        ) {
            (Some(date), Some(time)) => date.and_time(time),
            _ => return Err(StoreError::BadEndTime { task_id, value: end_time }),
        };

        let new_end = Duration::try_minutes(minutes)
            .and_then(|delta| end.checked_add_signed(delta))
            .ok_or(StoreError::SnoozeOutOfRange { task_id, minutes })?;
        let new_end_time = format_clock_time(new_end.time());
        sqlx::query("UPDATE tasks SET end_time = ? WHERE id = ?")
            .bind(&new_end_time)
            .bind(task_id)
            .execute(&self.pool)
            .await?;

        debug!("Snoozed task {} from {} to {}", task_id, end_time, new_end_time);
        Ok(new_end_time)
    }
}

/// Checks a task submitted for creation against the clock at `now`.
pub fn validate_new_task(task: &NewTask, now: NaiveDateTime) -> Result<(), TaskValidationError> {
    if task.title.trim().is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    let due = NaiveDate::parse_from_str(task.due_date.trim(), DUE_DATE_FORMAT)
        .map_err(|_| TaskValidationError::BadDueDate)?;
    let start = parse_clock_time(&task.start_time).ok_or(TaskValidationError::BadTime)?;
    let end = parse_clock_time(&task.end_time).ok_or(TaskValidationError::BadTime)?;

    if start >= end {
        return Err(TaskValidationError::StartNotBeforeEnd);
    }

    // Compared at minute resolution, like the times themselves.
    let this_minute = now.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(now);
    if due == now.date() && due.and_time(start) < this_minute {
        return Err(TaskValidationError::StartInPast);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    async fn seeded_store() -> SqliteTaskStore {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO users (id, username, email) VALUES (1, 'alice', 'alice@example.com')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO users (id, username, email) VALUES (2, 'bob', 'bob@example.com')")
            .execute(&pool)
            .await
            .unwrap();
        SqliteTaskStore::new(pool)
    }

    fn new_task(user_id: i64, title: &str, start: &str, end: &str) -> NewTask {
        NewTask {
            user_id,
            title: title.to_string(),
            category: Some("Work".to_string()),
            priority: Some("High".to_string()),
            due_date: "2024-06-01".to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
        }
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[tokio::test]
    async fn test_pending_reminders_join_owner_email() {
        let store = seeded_store().await;
        let id = store.add_task(&new_task(1, "Standup", "09:00 AM", "09:15 AM")).await.unwrap();
        store.add_task(&new_task(2, "Bob's task", "10:00 AM", "11:00 AM")).await.unwrap();

        let pending = store.pending_reminders(1).await.unwrap();
        assert_eq!(
            pending,
            vec![PendingReminder {
                id,
                title: "Standup".to_string(),
                due_date: "2024-06-01".to_string(),
                start_time: Some("09:00 AM".to_string()),
                email: "alice@example.com".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_completed_tasks_never_fetched() {
        let store = seeded_store().await;
        let done = store.add_task(&new_task(1, "Done", "09:00 AM", "09:15 AM")).await.unwrap();
        let open = store.add_task(&new_task(1, "Open", "09:00 AM", "09:15 AM")).await.unwrap();

        store.mark_completed(1, done).await.unwrap();

        let ids: Vec<i64> = store.pending_reminders(1).await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![open]);

        let tasks = store.list_tasks(1).await.unwrap();
        let completed = tasks.iter().find(|t| t.id == done).unwrap();
        assert_eq!(completed.status(), Some(TaskStatus::Completed));
        assert!(completed.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_mark_completed_scoped_to_owner() {
        let store = seeded_store().await;
        let id = store.add_task(&new_task(1, "Mine", "09:00 AM", "09:15 AM")).await.unwrap();

        let err = store.mark_completed(2, id).await.unwrap_err();
        assert!(matches!(err, StoreError::TaskNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_task() {
        let store = seeded_store().await;
        let id = store.add_task(&new_task(1, "Temp", "09:00 AM", "09:15 AM")).await.unwrap();

        store.delete_task(1, id).await.unwrap();
        assert!(store.list_tasks(1).await.unwrap().is_empty());
        assert!(matches!(store.delete_task(1, id).await, Err(StoreError::TaskNotFound(_))));
    }

    #[tokio::test]
    async fn test_snooze_pushes_end_time() {
        let store = seeded_store().await;
        let id = store.add_task(&new_task(1, "Read", "09:00 AM", "11:55 AM")).await.unwrap();

        let new_end = store.snooze_task(1, id, DEFAULT_SNOOZE_MINUTES).await.unwrap();
        assert_eq!(new_end, "12:05 PM");

        let task = store.list_tasks(1).await.unwrap().remove(0);
        assert_eq!(task.end_time.as_deref(), Some("12:05 PM"));
    }

    #[tokio::test]
    async fn test_snooze_out_of_range_is_an_error() {
        let store = seeded_store().await;
        let id = store.add_task(&new_task(1, "Read", "09:00 AM", "11:55 AM")).await.unwrap();

        let err = store.snooze_task(1, id, 10_000_000_000_000).await.unwrap_err();
        assert!(matches!(err, StoreError::SnoozeOutOfRange { minutes: 10_000_000_000_000, .. }));
        let err = store.snooze_task(1, id, i64::MAX).await.unwrap_err();
        assert!(matches!(err, StoreError::SnoozeOutOfRange { .. }));

        let task = store.list_tasks(1).await.unwrap().remove(0);
        assert_eq!(task.end_time.as_deref(), Some("11:55 AM"));
    }

    #[tokio::test]
    async fn test_snooze_rejects_unreadable_end_time() {
        let store = seeded_store().await;
        let id = store.add_task(&new_task(1, "Odd", "09:00 AM", "later")).await.unwrap();

        let err = store.snooze_task(1, id, 10).await.unwrap_err();
        assert!(matches!(err, StoreError::BadEndTime { .. }));
    }

    #[tokio::test]
    async fn test_user_for_session_ignores_expired() {
        let store = seeded_store().await;
        sqlx::query("INSERT INTO sessions (session_id, user_id, expires_at) VALUES (?, ?, ?)")
            .bind("live")
            .bind(1_i64)
            .bind(Utc::now() + Duration::minutes(30))
            .execute(store.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO sessions (session_id, user_id, expires_at) VALUES (?, ?, ?)")
            .bind("stale")
            .bind(2_i64)
            .bind(Utc::now() - Duration::minutes(1))
            .execute(store.pool())
            .await
            .unwrap();

        assert_eq!(store.user_for_session("live").await.unwrap(), Some(1));
        assert_eq!(store.user_for_session("stale").await.unwrap(), None);
        assert_eq!(store.user_for_session("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_user() {
        let store = seeded_store().await;
        let user = store.find_user(2).await.unwrap().unwrap();
        assert_eq!(user.email, "bob@example.com");
        assert!(store.find_user(99).await.unwrap().is_none());
    }

    #[test]
    fn test_validate_new_task() {
        let now = at("2024-06-01 08:30:40");

        assert_eq!(validate_new_task(&new_task(1, "Run", "09:00 AM", "10:00 AM"), now), Ok(()));
        assert_eq!(
            validate_new_task(&new_task(1, "  ", "09:00 AM", "10:00 AM"), now),
            Err(TaskValidationError::EmptyTitle)
        );
        assert_eq!(
            validate_new_task(&new_task(1, "Run", "10:00 AM", "09:00 AM"), now),
            Err(TaskValidationError::StartNotBeforeEnd)
        );
        assert_eq!(
            validate_new_task(&new_task(1, "Run", "25:99", "10:00 AM"), now),
            Err(TaskValidationError::BadTime)
        );
        assert_eq!(
            validate_new_task(&new_task(1, "Run", "08:00 AM", "10:00 AM"), now),
            Err(TaskValidationError::StartInPast)
        );
        // Same minute as now is still allowed.
        assert_eq!(validate_new_task(&new_task(1, "Run", "08:30 AM", "10:00 AM"), now), Ok(()));
    }
}
