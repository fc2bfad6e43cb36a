use crate::{
    abstract_trait::{
        AuthServiceTrait, DynCaptchaVerifier, DynHashing, DynSessionStore, DynUserQueryRepository,
    },
    cache::Session,
    domain::requests::LoginRequest,
    errors::ServiceError,
    model::User,
    utils::{Method, ServiceTracer},
};
use async_trait::async_trait;
use chrono::Duration;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use tracing::{info, warn};
use uuid::Uuid;

pub struct AuthService {
    query: DynUserQueryRepository,
    hash: DynHashing,
    captcha: DynCaptchaVerifier,
    sessions: DynSessionStore,
    session_ttl: Duration,
    tracer: ServiceTracer,
}

pub struct AuthServiceDeps {
    pub query: DynUserQueryRepository,
    pub hash: DynHashing,
    pub captcha: DynCaptchaVerifier,
    pub sessions: DynSessionStore,
    pub session_ttl: Duration,
}

impl AuthService {
    pub fn new(deps: AuthServiceDeps, registry: &mut Registry) -> Self {
        let AuthServiceDeps {
            query,
            hash,
            captcha,
            sessions,
            session_ttl,
        } = deps;

        Self {
            query,
            hash,
            captcha,
            sessions,
            session_ttl,
            tracer: ServiceTracer::new("auth-service", registry),
        }
    }

    /// A login containing `@` is treated as an e-mail address.
    async fn find_login(&self, login: &str) -> Result<Option<User>, ServiceError> {
        let user = if login.contains('@') {
            self.query.find_by_email(login).await?
        } else {
            self.query.find_by_username(login).await?
        };

        Ok(user)
    }

    async fn do_login(&self, req: &LoginRequest) -> Result<(String, Session), ServiceError> {
        if !self.captcha.verify(&req.recaptcha_response).await {
            return Err(ServiceError::Captcha);
        }

        let user = self
            .find_login(&req.username)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        self.hash
            .compare_password(&user.password, &req.password)
            .await?;

        if let Some(previous) = self.sessions.get_user_session(user.id).await {
            info!("🔁 Replacing previous session of user {}", user.id);
            self.sessions.delete_session(&previous).await;
        }

        let session_id = Uuid::new_v4().simple().to_string();
        let session = Session {
            user_id: user.id,
            username: user.username,
            role: user.role,
        };

        if !self
            .sessions
            .create_session(&session_id, &session, self.session_ttl)
            .await
        {
            return Err(ServiceError::Internal("Failed to create session".into()));
        }

        if !self
            .sessions
            .set_user_session(session.user_id, &session_id, self.session_ttl)
            .await
        {
            self.sessions.delete_session(&session_id).await;
            return Err(ServiceError::Internal("Failed to create session".into()));
        }

        Ok((session_id, session))
    }
}

#[async_trait]
impl AuthServiceTrait for AuthService {
    async fn login(&self, req: &LoginRequest) -> Result<(String, Session), ServiceError> {
        info!("🔐 Attempting login for: {}", req.username);

        let tracing_ctx = self.tracer.start_tracing(
            "login",
            vec![
                KeyValue::new("component", "auth"),
                KeyValue::new("login", req.username.clone()),
            ],
        );

        match self.do_login(req).await {
            Ok(result) => {
                self.tracer.complete_tracing_success(
                    &tracing_ctx,
                    Method::Post,
                    &format!("User {} logged in", result.1.username),
                );
                Ok(result)
            }
            Err(e) => {
                self.tracer.complete_tracing_error(
                    &tracing_ctx,
                    Method::Post,
                    &format!("Login failed for {}: {e}", req.username),
                );
                Err(e)
            }
        }
    }

    async fn authenticate(&self, session_id: &str) -> Result<Session, ServiceError> {
        let session = self
            .sessions
            .get_session(session_id)
            .await
            .ok_or_else(|| ServiceError::Unauthorized("Session expired or not found".into()))?;

        // only the most recent login of a user stays valid
        let current = self.sessions.get_user_session(session.user_id).await;
        if current.as_deref() != Some(session_id) {
            warn!("⚠️ Rejected superseded session of user {}", session.user_id);
            self.sessions.delete_session(session_id).await;
            return Err(ServiceError::Unauthorized(
                "Session was replaced by a newer login".into(),
            ));
        }

        self.sessions
            .refresh_session(session_id, self.session_ttl)
            .await;
        self.sessions
            .set_user_session(session.user_id, session_id, self.session_ttl)
            .await;

        Ok(session)
    }

    async fn logout(&self, session_id: &str) -> Result<(), ServiceError> {
        if let Some(session) = self.sessions.get_session(session_id).await {
            if self.sessions.get_user_session(session.user_id).await.as_deref() == Some(session_id)
            {
                self.sessions.delete_user_session(session.user_id).await;
            }
            info!("👋 User {} logged out", session.username);
        }

        self.sessions.delete_session(session_id).await;
        Ok(())
    }

    async fn revoke_user_sessions(&self, user_id: i64) -> Result<(), ServiceError> {
        if let Some(session_id) = self.sessions.get_user_session(user_id).await {
            self.sessions.delete_session(&session_id).await;
            info!("🚫 Revoked session of user {user_id}");
        }

        self.sessions.delete_user_session(user_id).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestBackend;

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.into(),
            password: password.into(),
            recaptcha_response: "token".into(),
        }
    }

    #[tokio::test]
    async fn login_accepts_username_or_email() {
        let backend = TestBackend::new();
        backend.seed_user("alice", "alice@example.com", "secret1", "USER").await;
        let deps = backend.dependencies();

        let (_, by_name) = deps.auth_service.login(&login("alice", "secret1")).await.unwrap();
        let (_, by_email) = deps
            .auth_service
            .login(&login("alice@example.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(by_name.username, "alice");
        assert_eq!(by_email.user_id, by_name.user_id);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_failed_captcha() {
        let backend = TestBackend::new();
        backend.seed_user("alice", "alice@example.com", "secret1", "USER").await;
        let deps = backend.dependencies();

        let wrong = deps.auth_service.login(&login("alice", "nope")).await;
        assert!(matches!(wrong, Err(ServiceError::InvalidCredentials)));

        let unknown = deps.auth_service.login(&login("bob", "secret1")).await;
        assert!(matches!(unknown, Err(ServiceError::InvalidCredentials)));

        backend.captcha.set_accept(false);
        let blocked = deps.auth_service.login(&login("alice", "secret1")).await;
        assert!(matches!(blocked, Err(ServiceError::Captcha)));
    }

    #[tokio::test]
    async fn second_login_invalidates_first_session() {
        let backend = TestBackend::new();
        backend.seed_user("alice", "alice@example.com", "secret1", "USER").await;
        let deps = backend.dependencies();

        let (first, _) = deps.auth_service.login(&login("alice", "secret1")).await.unwrap();
        assert!(deps.auth_service.authenticate(&first).await.is_ok());

        let (second, _) = deps.auth_service.login(&login("alice", "secret1")).await.unwrap();

        assert!(matches!(
            deps.auth_service.authenticate(&first).await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(deps.auth_service.authenticate(&second).await.is_ok());
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let backend = TestBackend::new();
        backend.seed_user("alice", "alice@example.com", "secret1", "USER").await;
        let deps = backend.dependencies();

        let (sid, _) = deps.auth_service.login(&login("alice", "secret1")).await.unwrap();
        deps.auth_service.logout(&sid).await.unwrap();

        assert!(deps.auth_service.authenticate(&sid).await.is_err());
    }
}
