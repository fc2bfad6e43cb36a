use axum::{
    Json,
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use shared::{cache::Session, errors::ErrorResponse};
use tracing::warn;

/// Must run after [`super::session::session_middleware`].
pub async fn admin_middleware(
    req: Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let Some(session) = req.extensions().get::<Session>() else {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                status: "fail".to_string(),
                message: "You are not logged in".to_string(),
            }),
        ));
    };

    if !session.is_admin() {
        warn!(
            "⛔ User {} with role {} denied access to {}",
            session.username,
            session.role,
            req.uri().path()
        );
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                status: "fail".to_string(),
                message: "Access denied. Required role: ADMIN".to_string(),
            }),
        ));
    }

    Ok(next.run(req).await)
}
