use serde::{Deserialize, Serialize};

use crate::models::task::{Task, TaskTiming};

#[derive(Deserialize)]
pub struct ListTasksRequest {
    // if needed
}

#[derive(Serialize)]
pub struct TaskEntry {
    #[serde(flatten)]
    pub task: Task,
    pub timing: Option<TaskTiming>,
}

#[derive(Serialize)]
pub struct ListTasksResponse {
    pub tasks: Vec<TaskEntry>,
}

#[derive(Deserialize)]
pub struct AddTaskRequest {
    pub title: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub due_date: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Serialize)]
pub struct AddTaskResponse {
    pub success: bool,
    pub message: String,
    pub task_id: Option<i64>,
}

// Shared by complete and delete
#[derive(Deserialize)]
pub struct TaskIdRequest {
    pub task_id: i64,
}

#[derive(Deserialize)]
pub struct SnoozeTaskRequest {
    pub task_id: i64,
    pub minutes: Option<i64>,
}

#[derive(Serialize)]
pub struct SnoozeTaskResponse {
    pub success: bool,
    pub message: String,
    pub end_time: Option<String>,
}

#[derive(Serialize)]
pub struct TaskDefaultResponse {
    pub success: bool,
    pub message: String,
}
