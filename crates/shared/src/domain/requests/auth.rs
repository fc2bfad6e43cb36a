use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Form body of `POST /login`. `username` accepts either a username or an e-mail.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,

    #[serde(rename = "g-recaptcha-response", default)]
    pub recaptcha_response: String,
}
