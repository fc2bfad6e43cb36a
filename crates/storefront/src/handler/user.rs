use crate::{
    middleware::{session::session_middleware, validate::SimpleValidatedJson},
    state::AppState,
};
use axum::{
    Extension, Json,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use shared::{
    abstract_trait::DynUserService,
    cache::Session,
    domain::{
        requests::{ChangeEmailRequest, ChangePasswordRequest, RegisterRequest},
        responses::{ApiResponse, UserResponse},
    },
    errors::HttpError,
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

/// Field rules are checked by the service after the CAPTCHA gate.
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<UserResponse>),
        (status = 400, description = "Validation, CAPTCHA or duplicate username/email")
    ),
    tag = "User"
)]
pub async fn register_handler(
    Extension(service): Extension<DynUserService>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.register(&body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "User"
)]
pub async fn get_me_handler(
    Extension(service): Extension<DynUserService>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.me(&session).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/users/change-password",
    security(("session_cookie" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Old password mismatch or new password too short"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "User"
)]
pub async fn change_password_handler(
    Extension(service): Extension<DynUserService>,
    Extension(session): Extension<Session>,
    SimpleValidatedJson(body): SimpleValidatedJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.change_password(&session, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/users/change-email",
    security(("session_cookie" = [])),
    request_body = ChangeEmailRequest,
    responses(
        (status = 200, description = "E-mail changed", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid or already used e-mail"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "User"
)]
pub async fn change_email_handler(
    Extension(service): Extension<DynUserService>,
    Extension(session): Extension<Session>,
    SimpleValidatedJson(body): SimpleValidatedJson<ChangeEmailRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.change_email(&session, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn user_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    let public = OpenApiRouter::new().route("/api/users/register", post(register_handler));

    let protected = OpenApiRouter::new()
        .route("/api/users/me", get(get_me_handler))
        .route("/api/users/change-password", post(change_password_handler))
        .route("/api/users/change-email", post(change_email_handler))
        .route_layer(middleware::from_fn(session_middleware));

    public
        .merge(protected)
        .layer(Extension(app_state.di_container.user_service.clone()))
        .layer(Extension(app_state.di_container.auth_service.clone()))
}
