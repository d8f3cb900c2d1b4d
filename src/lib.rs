pub mod config;
pub mod db;
pub mod error;
pub mod mailer;
pub mod models;
pub mod reminder;
pub mod routes;
pub mod store;
