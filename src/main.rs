use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use log::info;

use task_reminder_backend::config::Config;
use task_reminder_backend::db;
use task_reminder_backend::mailer::SmtpMailer;
use task_reminder_backend::reminder::ReminderRegistry;
use task_reminder_backend::routes;
use task_reminder_backend::store::SqliteTaskStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let pool = db::connect(&config.database_url)
        .await
        .context("Failed to create pool")?;
    let store = SqliteTaskStore::new(pool);

    let mailer = SmtpMailer::new(&config.smtp, config.reminder.lead_minutes())
        .context("Failed to configure SMTP transport")?;
    let registry = ReminderRegistry::new(Arc::new(store.clone()), Arc::new(mailer), config.reminder);

    let server_address = config.server_address.clone();
    info!("Server running at http://{}", server_address);

    let app_registry = registry.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(app_registry.clone()))
            .route("/", web::get().to(|| async { HttpResponse::Ok().body("Hello, world!") }))
            .configure(routes::routes::task_configure)
            .configure(routes::routes::reminder_configure)
    })
    .bind(&server_address)?
    .run()
    .await?;

    info!("Server stopped, cancelling {} reminder worker(s)", registry.active_count());
    registry.shutdown();
    Ok(())
}
