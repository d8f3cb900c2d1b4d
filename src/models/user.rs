use sqlx::FromRow;
use serde::{Deserialize, Serialize};

// Credentials live with the auth layer; only contact details are read here.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}
