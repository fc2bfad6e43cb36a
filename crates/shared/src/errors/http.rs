use crate::errors::{error::ErrorResponse, repository::RepositoryError, service::ServiceError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidCredentials => {
                HttpError::Unauthorized("Invalid credentials".to_string())
            }

            ServiceError::Unauthorized(msg) => HttpError::Unauthorized(msg),

            ServiceError::Forbidden(msg) => HttpError::Forbidden(msg),

            ServiceError::Captcha => {
                HttpError::BadRequest("CAPTCHA verification failed".to_string())
            }

            ServiceError::Validation(errors) => HttpError::BadRequest(errors.join("; ")),

            ServiceError::NotFound(msg) => HttpError::NotFound(msg),

            ServiceError::Repo(repo_err) => match repo_err {
                RepositoryError::NotFound => HttpError::NotFound("Not found".into()),
                RepositoryError::AlreadyExists(msg) => HttpError::Conflict(msg),
                other => {
                    error!("💥 Repository failure: {other}");
                    HttpError::Internal(format!("Repository error: {other}"))
                }
            },

            ServiceError::Bcrypt(_) => {
                HttpError::Internal("Internal authentication error".into())
            }

            ServiceError::Internal(msg) => HttpError::Internal(msg),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HttpError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            HttpError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            HttpError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            HttpError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            HttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse {
            status: "error".into(),
            message: msg,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_service_errors_to_status_codes() {
        let cases = vec![
            (ServiceError::Captcha, StatusCode::BAD_REQUEST),
            (ServiceError::validation("Cart is empty"), StatusCode::BAD_REQUEST),
            (ServiceError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ServiceError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (ServiceError::NotFound("Product not found".into()), StatusCode::NOT_FOUND),
            (
                ServiceError::Repo(RepositoryError::AlreadyExists("username".into())),
                StatusCode::CONFLICT,
            ),
            (
                ServiceError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = HttpError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
