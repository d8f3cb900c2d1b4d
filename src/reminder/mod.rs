// src/reminder/mod.rs

pub mod registry;
pub mod scheduler;
pub mod window;

pub use registry::ReminderRegistry;
pub use window::ReminderSettings;
