use crate::cache::Session;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: i64,
    pub username: String,
    pub role: String,
}

impl From<Session> for SessionResponse {
    fn from(value: Session) -> Self {
        SessionResponse {
            user_id: value.user_id,
            username: value.username,
            role: value.role,
        }
    }
}
