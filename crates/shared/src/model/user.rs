use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const ROLE_USER: &str = "USER";
pub const ROLE_ADMIN: &str = "ADMIN";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}
