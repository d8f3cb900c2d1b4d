use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ReminderRequest {
    // if needed
}

#[derive(Serialize)]
pub struct ReminderDefaultResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct ReminderStatusResponse {
    pub running: bool,
    pub email: Option<String>,
    pub lead_minutes: u64,
    pub window_secs: u64,
    pub poll_secs: u64,
}
