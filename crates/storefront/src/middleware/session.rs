use crate::middleware::SESSION_COOKIE;
use axum::{
    Extension, Json,
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use shared::{abstract_trait::DynAuthService, errors::ErrorResponse};
use tracing::debug;

/// Resolves the `SESSION` cookie to a [`shared::cache::Session`] and stores it
/// in the request extensions. The session TTL is refreshed on every hit.
pub async fn session_middleware(
    cookie_jar: CookieJar,
    Extension(auth): Extension<DynAuthService>,
    mut req: Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let session_id = match cookie_jar.get(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    status: "fail".to_string(),
                    message: "You are not logged in".to_string(),
                }),
            ));
        }
    };

    let session = match auth.authenticate(&session_id).await {
        Ok(session) => session,
        Err(e) => {
            debug!("Session lookup failed: {e}");
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    status: "fail".to_string(),
                    message: "Session expired or not found".to_string(),
                }),
            ));
        }
    };

    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}
