use actix_web::{web, HttpResponse, HttpRequest, Responder};
use log::{error, info};

use crate::reminder::ReminderRegistry;
use crate::routes::session_guard::current_user;
use crate::store::SqliteTaskStore;
use super::reminder_models::{ReminderRequest, ReminderDefaultResponse, ReminderStatusResponse};

pub async fn reminder_get() -> impl Responder {
    HttpResponse::Ok().body("Hello, this is the Reminder endpoint.")
}

// Called by the host once a session is established
pub async fn start_reminders(
    store: web::Data<SqliteTaskStore>,
    registry: web::Data<ReminderRegistry>,
    req: HttpRequest,
    _: web::Json<ReminderRequest>,
) -> impl Responder {
    let user = match current_user(&store, &req).await {
        Ok(user) => user,
        Err(rejection) => {
            return HttpResponse::build(rejection.status()).json(ReminderDefaultResponse {
                success: false,
                message: rejection.message().into(),
            });
        }
    };

    if registry.start(&user.session_id, user.user_id) {
        HttpResponse::Ok().json(ReminderDefaultResponse {
            success: true,
            message: "Reminders started".into(),
        })
    } else {
        info!("Reminders already running for session {}", user.session_id);
        HttpResponse::Ok().json(ReminderDefaultResponse {
            success: true,
            message: "Reminders already running".into(),
        })
    }
}

// Called by the host when a session ends
pub async fn stop_reminders(
    store: web::Data<SqliteTaskStore>,
    registry: web::Data<ReminderRegistry>,
    req: HttpRequest,
    _: web::Json<ReminderRequest>,
) -> impl Responder {
    let user = match current_user(&store, &req).await {
        Ok(user) => user,
        Err(rejection) => {
            return HttpResponse::build(rejection.status()).json(ReminderDefaultResponse {
                success: false,
                message: rejection.message().into(),
            });
        }
    };

    if registry.stop(&user.session_id) {
        HttpResponse::Ok().json(ReminderDefaultResponse {
            success: true,
            message: "Reminders stopped".into(),
        })
    } else {
        HttpResponse::BadRequest().json(ReminderDefaultResponse {
            success: false,
            message: "Reminders are not running".into(),
        })
    }
}

pub async fn reminder_status(
    store: web::Data<SqliteTaskStore>,
    registry: web::Data<ReminderRegistry>,
    req: HttpRequest,
    _: web::Json<ReminderRequest>,
) -> impl Responder {
    let settings = *registry.settings();
    let mut response = ReminderStatusResponse {
        running: false,
        email: None,
        lead_minutes: settings.lead_minutes(),
        window_secs: settings.window.as_secs(),
        poll_secs: settings.poll_interval.as_secs(),
    };

    let user = match current_user(&store, &req).await {
        Ok(user) => user,
        Err(rejection) => return HttpResponse::build(rejection.status()).json(response),
    };

    response.running = registry.is_running(&user.session_id);
    match store.find_user(user.user_id).await {
        Ok(found) => response.email = found.map(|u| u.email),
        Err(e) => {
            error!("Failed to fetch user {}: {}", user.user_id, e);
            return HttpResponse::InternalServerError().json(response);
        }
    }

    HttpResponse::Ok().json(response)
}
