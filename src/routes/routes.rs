use actix_web::web;

use super::task_view::task_view_handlers;

pub fn task_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api-tasks")
            .route("", web::get().to(task_view_handlers::task_view_get))
            .route("/", web::get().to(task_view_handlers::task_view_get))
            .route("/list", web::post().to(task_view_handlers::list_tasks))
            .route("/add", web::post().to(task_view_handlers::add_task))
            .route("/complete", web::post().to(task_view_handlers::complete_task))
            .route("/delete", web::post().to(task_view_handlers::delete_task))
            .route("/snooze", web::post().to(task_view_handlers::snooze_task))
    );
}

use super::reminder::reminder_handlers;

pub fn reminder_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api-reminder")
            .route("", web::get().to(reminder_handlers::reminder_get))
            .route("/", web::get().to(reminder_handlers::reminder_get))
            .route("/start", web::post().to(reminder_handlers::start_reminders))
            .route("/stop", web::post().to(reminder_handlers::stop_reminders))
            .route("/status", web::post().to(reminder_handlers::reminder_status))
    );
}
