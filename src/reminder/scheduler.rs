use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use log::{debug, info, warn};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::window::{parse_task_start, ReminderSettings};
use crate::error::StoreError;
use crate::mailer::EmailSender;
use crate::store::TaskStore;

const MAX_STORE_BACKOFF: Duration = Duration::from_secs(5 * 60);

/// Outcome of one poll cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub sent: usize,
    pub failed: usize,
    pub unparsable: usize,
}

/// Polls one user's pending tasks and emails each task once as it enters
/// its reminder window.
///
/// The set of reminded task ids lives only as long as this value, so a
/// restarted scheduler may remind a task again if its window is still open.
pub struct ReminderScheduler {
    user_id: i64,
    store: Arc<dyn TaskStore>,
    sender: Arc<dyn EmailSender>,
    settings: ReminderSettings,
    session_id: Option<String>,
    reminded: HashSet<i64>,
    run_id: Uuid,
}

impl ReminderScheduler {
    pub fn new(
        user_id: i64,
        store: Arc<dyn TaskStore>,
        sender: Arc<dyn EmailSender>,
        settings: ReminderSettings,
    ) -> Self {
        ReminderScheduler {
            user_id,
            store,
            sender,
            settings,
            session_id: None,
            reminded: HashSet::new(),
            run_id: Uuid::new_v4(),
        }
    }

    /// Ties the scheduler to a login session: `run` returns once the session
    /// expires, is deleted, or no longer belongs to this user.
    pub fn for_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    async fn session_active(&self) -> Result<bool, StoreError> {
        match &self.session_id {
            Some(session_id) => Ok(self.store.user_for_session(session_id).await? == Some(self.user_id)),
            None => Ok(true),
        }
    }

    pub fn has_reminded(&self, task_id: i64) -> bool {
        self.reminded.contains(&task_id)
    }

    pub fn sent_count(&self) -> usize {
        self.reminded.len()
    }

    /// Runs a single cycle as if the wall clock read `now`.
    ///
    /// Tasks whose date or time cannot be parsed are skipped. A failed send
    /// leaves the task unrecorded so the next cycle tries again while the
    /// window is still open.
    pub async fn poll_once(&mut self, now: NaiveDateTime) -> Result<CycleReport, StoreError> {
        let tasks = self.store.pending_reminders(self.user_id).await?;
        let mut report = CycleReport::default();

        for task in tasks {
            let start_time = task.start_time.as_deref().unwrap_or_default();
            let start = match parse_task_start(&task.due_date, start_time) {
                Some(start) => start,
                None => {
                    debug!(
                        "[{}] Skipping task {} with unreadable schedule '{} {}'",
                        self.run_id, task.id, task.due_date, start_time
                    );
                    report.unparsable += 1;
                    continue;
                }
            };

            if !self.settings.is_due(start, now) || self.reminded.contains(&task.id) {
                continue;
            }

            match self.sender.send_reminder(&task.email, &task.title, start_time).await {
                Ok(()) => {
                    info!("[{}] Reminded user {} about task {}", self.run_id, self.user_id, task.id);
                    self.reminded.insert(task.id);
                    report.sent += 1;
                }
                Err(e) => {
                    warn!(
                        "[{}] Failed to send reminder for task {} to {}: {}",
                        self.run_id, task.id, task.email, e
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Polls until `cancel` fires or the bound session ends. Store failures
    /// back off (doubling the poll interval up to five minutes) and never end
    /// the loop.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            "[{}] Reminder scheduler started for user {} (every {:?})",
            self.run_id, self.user_id, self.settings.poll_interval
        );

        let mut interval = tokio::time::interval(self.settings.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut backoff: Option<Duration> = None;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            let result = match self.session_active().await {
                Ok(true) => self.poll_once(Local::now().naive_local()).await,
                Ok(false) => {
                    info!("[{}] Session for user {} has ended", self.run_id, self.user_id);
                    break;
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(report) => {
                    if report.sent > 0 || report.failed > 0 {
                        debug!("[{}] Cycle finished: {:?}", self.run_id, report);
                    }
                    backoff = None;
                }
                Err(e) => {
                    let delay = next_backoff(backoff, self.settings.poll_interval);
                    warn!(
                        "[{}] Failed to read pending tasks for user {}: {}. Retrying in {:?}...",
                        self.run_id, self.user_id, e, delay
                    );
                    backoff = Some(delay);

                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                    interval.reset_immediately();
                }
            }
        }

        info!(
            "[{}] Reminder scheduler stopped for user {} after {} reminder(s)",
            self.run_id,
            self.user_id,
            self.reminded.len()
        );
    }
}

fn next_backoff(current: Option<Duration>, base: Duration) -> Duration {
    match current {
        None => base,
        Some(delay) => (delay * 2).min(MAX_STORE_BACKOFF),
    }
}
