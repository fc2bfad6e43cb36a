//! Router-level test harness backed by `shared::testing` fakes, so the HTTP
//! tests need neither Postgres nor Redis.
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::Value;
use shared::{model::User, testing::TestBackend};
use storefront::{handler::AppRouter, state::AppState};
use tower::ServiceExt;

pub struct TestContext {
    pub backend: TestBackend,
    pub app: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
    /// `SESSION=<id>` taken from `Set-Cookie`, ready for a `Cookie` header.
    pub session_cookie: Option<String>,
}

impl TestContext {
    pub fn new() -> Self {
        let backend = TestBackend::new();
        let app = AppRouter::router(AppState::from_deps(backend.deps()));

        Self { backend, app }
    }

    pub async fn seed_user(&self, username: &str, role: &str) -> User {
        self.backend
            .seed_user(username, &format!("{username}@example.com"), "secret1", role)
            .await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let session_cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .find(|v| v.starts_with("SESSION="))
            .map(str::to_string);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            text,
            session_cookie,
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(request("GET", uri, cookie, Body::empty(), None)).await
    }

    pub async fn post(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(request("POST", uri, cookie, Body::empty(), None)).await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(request("DELETE", uri, cookie, Body::empty(), None)).await
    }

    pub async fn send_json(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Value,
    ) -> TestResponse {
        self.send(request(
            method,
            uri,
            cookie,
            Body::from(body.to_string()),
            Some("application/json"),
        ))
        .await
    }

    pub async fn login_with(&self, login: &str, password: &str) -> TestResponse {
        let form = format!("username={login}&password={password}&g-recaptcha-response=token");

        self.send(request(
            "POST",
            "/login",
            None,
            Body::from(form),
            Some("application/x-www-form-urlencoded"),
        ))
        .await
    }

    /// Logs in with the password every seeded user gets and returns the cookie.
    pub async fn login(&self, username: &str) -> String {
        let response = self.login_with(username, "secret1").await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);

        response.session_cookie.expect("SESSION cookie")
    }
}

fn request(
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Body,
    content_type: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }

    builder.body(body).unwrap()
}
