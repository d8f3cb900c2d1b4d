use thiserror::Error;

/// Failures reading configuration from the environment.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Failures talking to the task store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("task {0} not found")]
    TaskNotFound(i64),

    #[error("task {task_id} has an unreadable end time '{value}'")]
    BadEndTime { task_id: i64, value: String },

    #[error("cannot snooze task {task_id} by {minutes} minutes")]
    SnoozeOutOfRange { task_id: i64, minutes: i64 },
}

/// Failures building or delivering a reminder email.
#[derive(Error, Debug)]
pub enum MailError {
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("{0}")]
    Other(String),
}

/// Rejections for a task submitted through the task view.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TaskValidationError {
    #[error("Task title required")]
    EmptyTitle,

    #[error("Due date must look like YYYY-MM-DD")]
    BadDueDate,

    #[error("Times must look like hh:mm AM/PM")]
    BadTime,

    #[error("Start time must be before end time")]
    StartNotBeforeEnd,

    #[error("Start time cannot be in the past")]
    StartInPast,
}
