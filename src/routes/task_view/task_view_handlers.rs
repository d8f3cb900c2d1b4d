use actix_web::{web, HttpResponse, HttpRequest, Responder};
use chrono::Local;
use log::{error, info};

use crate::error::StoreError;
use crate::models::task::NewTask;
use crate::routes::session_guard::current_user;
use crate::store::{validate_new_task, SqliteTaskStore, DEFAULT_SNOOZE_MINUTES};
use super::task_view_models::{
    ListTasksRequest, ListTasksResponse, TaskEntry,
    AddTaskRequest, AddTaskResponse,
    TaskIdRequest, TaskDefaultResponse,
    SnoozeTaskRequest, SnoozeTaskResponse,
};

// Only the time of day is stored, so a longer snooze has no meaning.
const MAX_SNOOZE_MINUTES: i64 = 24 * 60;

// Default handler for task view root
pub async fn task_view_get() -> impl Responder {
    HttpResponse::Ok().body("Hello, this is the Task View endpoint.")
}

fn failure(message: impl Into<String>) -> TaskDefaultResponse {
    TaskDefaultResponse {
        success: false,
        message: message.into(),
    }
}

// Handler to list every task of the session's user
pub async fn list_tasks(
    store: web::Data<SqliteTaskStore>,
    req: HttpRequest,
    _: web::Json<ListTasksRequest>,
) -> impl Responder {
    let user = match current_user(&store, &req).await {
        Ok(user) => user,
        Err(rejection) => {
            return HttpResponse::build(rejection.status()).json(ListTasksResponse { tasks: Vec::new() });
        }
    };

    match store.list_tasks(user.user_id).await {
        Ok(tasks) => {
            info!("Listed {} tasks for user {}", tasks.len(), user.user_id);
            let now = Local::now().naive_local();
            let tasks = tasks
                .into_iter()
                .map(|task| TaskEntry { timing: task.timing(now), task })
                .collect();
            HttpResponse::Ok().json(ListTasksResponse { tasks })
        }
        Err(e) => {
            error!("Failed to list tasks for user {}: {}", user.user_id, e);
            HttpResponse::InternalServerError().json(ListTasksResponse { tasks: Vec::new() })
        }
    }
}

// Handler to add a task
pub async fn add_task(
    store: web::Data<SqliteTaskStore>,
    req: HttpRequest,
    request: web::Json<AddTaskRequest>,
) -> impl Responder {
    let user = match current_user(&store, &req).await {
        Ok(user) => user,
        Err(rejection) => {
            return HttpResponse::build(rejection.status()).json(AddTaskResponse {
                success: false,
                message: rejection.message().into(),
                task_id: None,
            });
        }
    };

    let request = request.into_inner();
    let task = NewTask {
        user_id: user.user_id,
        title: request.title.trim().to_string(),
        category: request.category,
        priority: request.priority,
        due_date: request.due_date.trim().to_string(),
        start_time: request.start_time.trim().to_string(),
        end_time: request.end_time.trim().to_string(),
    };

    if let Err(e) = validate_new_task(&task, Local::now().naive_local()) {
        info!("Rejected task for user {}: {}", user.user_id, e);
        return HttpResponse::BadRequest().json(AddTaskResponse {
            success: false,
            message: e.to_string(),
            task_id: None,
        });
    }

    match store.add_task(&task).await {
        Ok(task_id) => {
            info!("Task {} added for user {}", task_id, user.user_id);
            HttpResponse::Ok().json(AddTaskResponse {
                success: true,
                message: "Task added successfully".into(),
                task_id: Some(task_id),
            })
        }
        Err(e) => {
            error!("Failed to add task for user {}: {}", user.user_id, e);
            HttpResponse::InternalServerError().json(AddTaskResponse {
                success: false,
                message: "Failed to add task".into(),
                task_id: None,
            })
        }
    }
}

// Handler to mark a task completed
pub async fn complete_task(
    store: web::Data<SqliteTaskStore>,
    req: HttpRequest,
    request: web::Json<TaskIdRequest>,
) -> impl Responder {
    let user = match current_user(&store, &req).await {
        Ok(user) => user,
        Err(rejection) => return HttpResponse::build(rejection.status()).json(failure(rejection.message())),
    };

    match store.mark_completed(user.user_id, request.task_id).await {
        Ok(()) => {
            info!("Task {} completed by user {}", request.task_id, user.user_id);
            HttpResponse::Ok().json(TaskDefaultResponse {
                success: true,
                message: "Task marked as completed".into(),
            })
        }
        Err(StoreError::TaskNotFound(task_id)) => {
            info!("Task {} not found for user {}", task_id, user.user_id);
            HttpResponse::NotFound().json(failure("Task not found"))
        }
        Err(e) => {
            error!("Failed to complete task {}: {}", request.task_id, e);
            HttpResponse::InternalServerError().json(failure("Failed to complete task"))
        }
    }
}

// Handler to delete a task
pub async fn delete_task(
    store: web::Data<SqliteTaskStore>,
    req: HttpRequest,
    request: web::Json<TaskIdRequest>,
) -> impl Responder {
    let user = match current_user(&store, &req).await {
        Ok(user) => user,
        Err(rejection) => return HttpResponse::build(rejection.status()).json(failure(rejection.message())),
    };

    match store.delete_task(user.user_id, request.task_id).await {
        Ok(()) => {
            info!("Task {} deleted by user {}", request.task_id, user.user_id);
            HttpResponse::Ok().json(TaskDefaultResponse {
                success: true,
                message: "Task deleted".into(),
            })
        }
        Err(StoreError::TaskNotFound(task_id)) => {
            info!("Task {} not found for user {}", task_id, user.user_id);
            HttpResponse::NotFound().json(failure("Task not found"))
        }
        Err(e) => {
            error!("Failed to delete task {}: {}", request.task_id, e);
            HttpResponse::InternalServerError().json(failure("Failed to delete task"))
        }
    }
}

// Handler to push a task's end time back
pub async fn snooze_task(
    store: web::Data<SqliteTaskStore>,
    req: HttpRequest,
    request: web::Json<SnoozeTaskRequest>,
) -> impl Responder {
    let user = match current_user(&store, &req).await {
        Ok(user) => user,
        Err(rejection) => {
            return HttpResponse::build(rejection.status()).json(SnoozeTaskResponse {
                success: false,
                message: rejection.message().into(),
                end_time: None,
            });
        }
    };

    let minutes = request.minutes.unwrap_or(DEFAULT_SNOOZE_MINUTES);
    if minutes <= 0 || minutes > MAX_SNOOZE_MINUTES {
        info!("Rejected snooze of {} minutes for task {}", minutes, request.task_id);
        return HttpResponse::BadRequest().json(SnoozeTaskResponse {
            success: false,
            message: format!("Snooze minutes must be between 1 and {}", MAX_SNOOZE_MINUTES),
            end_time: None,
        });
    }

    match store.snooze_task(user.user_id, request.task_id, minutes).await {
        Ok(end_time) => {
            info!("Task {} snoozed by {} minutes", request.task_id, minutes);
            HttpResponse::Ok().json(SnoozeTaskResponse {
                success: true,
                message: format!("Task snoozed by {} minutes", minutes),
                end_time: Some(end_time),
            })
        }
        Err(StoreError::TaskNotFound(_)) => HttpResponse::NotFound().json(SnoozeTaskResponse {
            success: false,
            message: "Task not found".into(),
            end_time: None,
        }),
        Err(e @ StoreError::BadEndTime { .. }) => {
            info!("Cannot snooze task {}: {}", request.task_id, e);
            HttpResponse::BadRequest().json(SnoozeTaskResponse {
                success: false,
                message: "Task has no valid end time".into(),
                end_time: None,
            })
        }
        Err(e @ StoreError::SnoozeOutOfRange { .. }) => {
            info!("Cannot snooze task {}: {}", request.task_id, e);
            HttpResponse::BadRequest().json(SnoozeTaskResponse {
                success: false,
                message: "Snooze is out of range".into(),
                end_time: None,
            })
        }
        Err(e) => {
            error!("Failed to snooze task {}: {}", request.task_id, e);
            HttpResponse::InternalServerError().json(SnoozeTaskResponse {
                success: false,
                message: "Failed to snooze task".into(),
                end_time: None,
            })
        }
    }
}
