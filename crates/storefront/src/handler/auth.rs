use crate::{middleware::SESSION_COOKIE, state::AppState};
use axum::{
    Extension, Form, Json,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use shared::{
    abstract_trait::DynAuthService,
    domain::{
        requests::LoginRequest,
        responses::{ApiResponse, SessionResponse},
    },
    errors::HttpError,
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

fn session_cookie(value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful, SESSION cookie set", body = ApiResponse<SessionResponse>),
        (status = 400, description = "CAPTCHA verification failed"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login_handler(
    Extension(service): Extension<DynAuthService>,
    cookie_jar: CookieJar,
    Form(body): Form<LoginRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let (session_id, session) = service.login(&body).await?;

    let response = ApiResponse::success("Login successful", SessionResponse::from(session));

    Ok((
        StatusCode::OK,
        cookie_jar.add(session_cookie(session_id)),
        Json(response),
    ))
}

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Session removed and cookie cleared")
    ),
    tag = "Auth"
)]
pub async fn logout_handler(
    Extension(service): Extension<DynAuthService>,
    cookie_jar: CookieJar,
) -> Result<impl IntoResponse, HttpError> {
    if let Some(cookie) = cookie_jar.get(SESSION_COOKIE) {
        service.logout(cookie.value()).await?;
    }

    let response = ApiResponse::success("Logout successful", ());

    Ok((
        StatusCode::OK,
        cookie_jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Json(response),
    ))
}

pub fn auth_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .layer(Extension(app_state.di_container.auth_service.clone()))
}
