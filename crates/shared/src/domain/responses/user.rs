use crate::model::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Public view of a user. The password hash never leaves the service layer.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        UserResponse {
            id: value.id,
            username: value.username,
            email: value.email,
            role: value.role,
        }
    }
}
