pub mod routes;
pub mod session_guard;

pub mod task_view {
    pub mod task_view_handlers;
    pub mod task_view_models;
}

pub mod reminder {
    pub mod reminder_handlers;
    pub mod reminder_models;
}
