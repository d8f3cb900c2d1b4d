use actix_web::http::StatusCode;
use actix_web::HttpRequest;
use log::{error, info};

use crate::store::{SqliteTaskStore, TaskStore};

pub const SESSION_COOKIE: &str = "session_id";

pub struct SessionUser {
    pub session_id: String,
    pub user_id: i64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SessionRejection {
    MissingCookie,
    InvalidSession,
    StoreFailure,
}

impl SessionRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            SessionRejection::MissingCookie => StatusCode::BAD_REQUEST,
            SessionRejection::InvalidSession => StatusCode::UNAUTHORIZED,
            SessionRejection::StoreFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            SessionRejection::MissingCookie => "Session ID not found in cookies",
            SessionRejection::InvalidSession => "Login is needed, invalid or expired session",
            SessionRejection::StoreFailure => "Failed to validate session",
        }
    }
}

// Sessions are issued by the auth layer; here they are only looked up.
pub async fn current_user(store: &SqliteTaskStore, req: &HttpRequest) -> Result<SessionUser, SessionRejection> {
    let session_id = match req.cookie(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => {
            info!("Session ID not found in cookies for {}", req.path());
            return Err(SessionRejection::MissingCookie);
        }
    };

    match store.user_for_session(&session_id).await {
        Ok(Some(user_id)) => Ok(SessionUser { session_id, user_id }),
        Ok(None) => {
            info!("Invalid or expired session ID: {}", session_id);
            Err(SessionRejection::InvalidSession)
        }
        Err(e) => {
            error!("Failed to validate session ID {}: {}", session_id, e);
            Err(SessionRejection::StoreFailure)
        }
    }
}
