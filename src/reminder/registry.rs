use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{error, info};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::scheduler::ReminderScheduler;
use super::window::ReminderSettings;
use crate::mailer::EmailSender;
use crate::store::TaskStore;

struct RunningScheduler {
    user_id: i64,
    cancel: CancellationToken,
    generation: Uuid,
}

/// Running reminder schedulers, one per session. Each session gets its own
/// scheduler and its own record of reminded tasks.
#[derive(Clone)]
pub struct ReminderRegistry {
    running: Arc<DashMap<String, RunningScheduler>>,
    store: Arc<dyn TaskStore>,
    sender: Arc<dyn EmailSender>,
    settings: ReminderSettings,
    shutdown: CancellationToken,
}

impl ReminderRegistry {
    pub fn new(store: Arc<dyn TaskStore>, sender: Arc<dyn EmailSender>, settings: ReminderSettings) -> Self {
        ReminderRegistry {
            running: Arc::new(DashMap::new()),
            store,
            sender,
            settings,
            shutdown: CancellationToken::new(),
        }
    }

    /// Spawns a scheduler for the session. Returns `false` if one is already running.
    ///
    /// The entry is dropped again when the scheduler exits on its own, which
    /// happens when the session expires or the worker panics.
    pub fn start(&self, session_id: &str, user_id: i64) -> bool {
        let generation = Uuid::new_v4();
        let worker = match self.running.entry(session_id.to_string()) {
            Entry::Occupied(_) => return false,
            Entry::Vacant(slot) => {
                let cancel = self.shutdown.child_token();
                let scheduler = ReminderScheduler::new(
                    user_id,
                    self.store.clone(),
                    self.sender.clone(),
                    self.settings,
                )
                .for_session(session_id);
                let worker = tokio::spawn(scheduler.run(cancel.clone()));
                slot.insert(RunningScheduler { user_id, cancel, generation });
                worker
            }
        };
        info!("Started reminders for user {} (session {})", user_id, session_id);

        let running = self.running.clone();
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = worker.await {
                if e.is_panic() {
                    error!("Reminder scheduler for session {} panicked", session_id);
                }
            }
            if running
                .remove_if(&session_id, |_, entry| entry.generation == generation)
                .is_some()
            {
                info!("Reminders for user {} (session {}) ended", user_id, session_id);
            }
        });
        true
    }

    /// Cancels the session's scheduler. Returns `false` if none was running.
    pub fn stop(&self, session_id: &str) -> bool {
        match self.running.remove(session_id) {
            Some((_, running)) => {
                running.cancel.cancel();
                info!("Stopped reminders for user {} (session {})", running.user_id, session_id);
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, session_id: &str) -> bool {
        self.running.contains_key(session_id)
    }

    pub fn active_count(&self) -> usize {
        self.running.len()
    }

    pub fn settings(&self) -> &ReminderSettings {
        &self.settings
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.running.clear();
    }
}
