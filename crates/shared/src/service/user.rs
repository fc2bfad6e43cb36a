use crate::{
    abstract_trait::{
        DynAuthService, DynCaptchaVerifier, DynHashing, DynUserCommandRepository,
        DynUserQueryRepository, UserServiceTrait,
    },
    cache::Session,
    domain::{
        requests::{
            ChangeEmailRequest, ChangePasswordRequest, ChangeRoleRequest, CreateUserRequest,
            RegisterRequest,
        },
        responses::{ApiResponse, UserResponse},
    },
    errors::ServiceError,
    model::{ROLE_ADMIN, ROLE_USER, User},
    utils::{Method, ServiceTracer, TracingContext},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use tracing::{info, warn};
use validator::Validate;

pub struct UserService {
    query: DynUserQueryRepository,
    command: DynUserCommandRepository,
    hash: DynHashing,
    captcha: DynCaptchaVerifier,
    auth: DynAuthService,
    tracer: ServiceTracer,
}

pub struct UserServiceDeps {
    pub query: DynUserQueryRepository,
    pub command: DynUserCommandRepository,
    pub hash: DynHashing,
    pub captcha: DynCaptchaVerifier,
    pub auth: DynAuthService,
}

impl UserService {
    pub fn new(deps: UserServiceDeps, registry: &mut Registry) -> Self {
        let UserServiceDeps {
            query,
            command,
            hash,
            captcha,
            auth,
        } = deps;

        Self {
            query,
            command,
            hash,
            captcha,
            auth,
            tracer: ServiceTracer::new("user-service", registry),
        }
    }

    async fn find_user(&self, user_id: i64) -> Result<User, ServiceError> {
        self.query
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".into()))
    }

    fn finish<T>(
        &self,
        tracing_ctx: &TracingContext,
        method: Method,
        result: Result<T, ServiceError>,
        message: &str,
    ) -> Result<T, ServiceError> {
        match &result {
            Ok(_) => self
                .tracer
                .complete_tracing_success(tracing_ctx, method, message),
            Err(e) => self.tracer.complete_tracing_error(
                tracing_ctx,
                method,
                &format!("{message} failed: {e}"),
            ),
        }
        result
    }

    async fn do_register(&self, req: &RegisterRequest) -> Result<User, ServiceError> {
        if !self.captcha.verify(&req.recaptcha_response).await {
            return Err(ServiceError::Captcha);
        }

        req.validate()?;

        if self.query.find_by_username(&req.username).await?.is_some() {
            return Err(ServiceError::validation("Username already exists"));
        }

        if self.query.find_by_email(&req.email).await?.is_some() {
            return Err(ServiceError::validation("Email already exists"));
        }

        let hashed = self.hash.hash_password(&req.password).await?;

        let user = self
            .command
            .create_user(&CreateUserRequest {
                username: req.username.clone(),
                email: req.email.clone(),
                password: hashed,
                role: ROLE_USER.to_string(),
            })
            .await?;

        Ok(user)
    }

    async fn do_change_password(
        &self,
        session: &Session,
        req: &ChangePasswordRequest,
    ) -> Result<(), ServiceError> {
        let user = self.find_user(session.user_id).await?;

        self.hash
            .compare_password(&user.password, &req.old_password)
            .await
            .map_err(|e| match e {
                ServiceError::InvalidCredentials => {
                    ServiceError::validation("Old password is incorrect")
                }
                other => other,
            })?;

        req.validate()?;

        let hashed = self.hash.hash_password(&req.new_password).await?;
        self.command.update_password(user.id, &hashed).await?;

        Ok(())
    }

    async fn do_change_email(
        &self,
        session: &Session,
        req: &ChangeEmailRequest,
    ) -> Result<User, ServiceError> {
        req.validate()?;

        let user = self.find_user(session.user_id).await?;

        if let Some(owner) = self.query.find_by_email(&req.new_email).await?
            && owner.id != user.id
        {
            return Err(ServiceError::validation("Email is already in use"));
        }

        let user = self.command.update_email(user.id, &req.new_email).await?;
        Ok(user)
    }

    async fn do_change_role(
        &self,
        user_id: i64,
        req: &ChangeRoleRequest,
    ) -> Result<User, ServiceError> {
        req.validate()?;

        self.find_user(user_id).await?;
        let user = self.command.update_role(user_id, &req.role).await?;
        self.auth.revoke_user_sessions(user_id).await?;

        Ok(user)
    }

    async fn do_delete_user(&self, user_id: i64) -> Result<(), ServiceError> {
        self.find_user(user_id).await?;
        self.command.delete_user(user_id).await?;
        self.auth.revoke_user_sessions(user_id).await?;

        Ok(())
    }
}

#[async_trait]
impl UserServiceTrait for UserService {
    async fn register(
        &self,
        req: &RegisterRequest,
    ) -> Result<ApiResponse<UserResponse>, ServiceError> {
        info!("📝 Registering user: {}", req.username);

        let tracing_ctx = self.tracer.start_tracing(
            "register_user",
            vec![
                KeyValue::new("component", "user"),
                KeyValue::new("username", req.username.clone()),
            ],
        );

        let result = self.do_register(req).await;
        let user = self.finish(&tracing_ctx, Method::Post, result, "Register user")?;

        Ok(ApiResponse::success(
            "User registered successfully",
            UserResponse::from(user),
        ))
    }

    async fn me(&self, session: &Session) -> Result<ApiResponse<UserResponse>, ServiceError> {
        let user = self.find_user(session.user_id).await?;

        Ok(ApiResponse::success(
            "User retrieved successfully",
            UserResponse::from(user),
        ))
    }

    async fn change_password(
        &self,
        session: &Session,
        req: &ChangePasswordRequest,
    ) -> Result<ApiResponse<()>, ServiceError> {
        let tracing_ctx = self.tracer.start_tracing(
            "change_password",
            vec![
                KeyValue::new("component", "user"),
                KeyValue::new("user_id", session.user_id),
            ],
        );

        let result = self.do_change_password(session, req).await;
        self.finish(&tracing_ctx, Method::Post, result, "Change password")?;

        info!("🔑 Password changed for user {}", session.username);
        Ok(ApiResponse::success("Password changed successfully", ()))
    }

    async fn change_email(
        &self,
        session: &Session,
        req: &ChangeEmailRequest,
    ) -> Result<ApiResponse<UserResponse>, ServiceError> {
        let tracing_ctx = self.tracer.start_tracing(
            "change_email",
            vec![
                KeyValue::new("component", "user"),
                KeyValue::new("user_id", session.user_id),
            ],
        );

        let result = self.do_change_email(session, req).await;
        let user = self.finish(&tracing_ctx, Method::Post, result, "Change email")?;

        Ok(ApiResponse::success(
            "Email changed successfully",
            UserResponse::from(user),
        ))
    }

    async fn find_all(&self) -> Result<ApiResponse<Vec<UserResponse>>, ServiceError> {
        let tracing_ctx = self
            .tracer
            .start_tracing("find_all_users", vec![KeyValue::new("component", "user")]);

        let result = self.query.find_all().await.map_err(ServiceError::from);
        let users = self.finish(&tracing_ctx, Method::Get, result, "Find all users")?;

        Ok(ApiResponse::success(
            "Users retrieved successfully",
            users.into_iter().map(UserResponse::from).collect(),
        ))
    }

    async fn change_role(
        &self,
        user_id: i64,
        req: &ChangeRoleRequest,
    ) -> Result<ApiResponse<UserResponse>, ServiceError> {
        let tracing_ctx = self.tracer.start_tracing(
            "change_role",
            vec![
                KeyValue::new("component", "user"),
                KeyValue::new("user_id", user_id),
                KeyValue::new("role", req.role.clone()),
            ],
        );

        let result = self.do_change_role(user_id, req).await;
        let user = self.finish(&tracing_ctx, Method::Put, result, "Change role")?;

        Ok(ApiResponse::success(
            "Role updated successfully",
            UserResponse::from(user),
        ))
    }

    async fn delete_user(&self, user_id: i64) -> Result<ApiResponse<()>, ServiceError> {
        let tracing_ctx = self.tracer.start_tracing(
            "delete_user",
            vec![
                KeyValue::new("component", "user"),
                KeyValue::new("user_id", user_id),
            ],
        );

        let result = self.do_delete_user(user_id).await;
        self.finish(&tracing_ctx, Method::Delete, result, "Delete user")?;

        Ok(ApiResponse::success("User deleted successfully", ()))
    }

    async fn ensure_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ServiceError> {
        if let Some(existing) = self.query.find_by_username(username).await? {
            if !existing.is_admin() {
                warn!("⚠️ Bootstrap admin '{username}' exists without ADMIN role");
            }
            return Ok(());
        }

        let hashed = self.hash.hash_password(password).await?;

        self.command
            .create_user(&CreateUserRequest {
                username: username.to_string(),
                email: email.to_string(),
                password: hashed,
                role: ROLE_ADMIN.to_string(),
            })
            .await?;

        info!("👑 Created bootstrap admin '{username}'");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{abstract_trait::HashingTrait, testing::TestBackend};

    fn register(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            recaptcha_response: "token".into(),
        }
    }

    fn session_of(user: &User) -> Session {
        Session {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role.clone(),
        }
    }

    #[tokio::test]
    async fn register_creates_user_with_hashed_password() {
        let backend = TestBackend::new();
        let deps = backend.dependencies();

        let response = deps
            .user_service
            .register(&register("alice", "alice@example.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(response.data.username, "alice");
        assert_eq!(response.data.role, "USER");

        let stored = backend.user_by_name("alice").await.unwrap();
        assert_ne!(stored.password, "secret1");
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username() {
        let backend = TestBackend::new();
        let deps = backend.dependencies();

        deps.user_service
            .register(&register("alice", "alice@example.com", "secret1"))
            .await
            .unwrap();

        let duplicate = deps
            .user_service
            .register(&register("alice", "other@example.com", "secret1"))
            .await;

        assert!(matches!(duplicate, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn register_checks_captcha_before_input() {
        let backend = TestBackend::new();
        backend.captcha.set_accept(false);
        let deps = backend.dependencies();

        let result = deps.user_service.register(&register("", "bad", "1")).await;

        assert!(matches!(result, Err(ServiceError::Captcha)));
    }

    #[tokio::test]
    async fn register_validates_fields() {
        let backend = TestBackend::new();
        let deps = backend.dependencies();

        let bad_email = deps
            .user_service
            .register(&register("alice", "alice@nowhere", "secret1"))
            .await;
        let short_password = deps
            .user_service
            .register(&register("alice", "alice@example.com", "123"))
            .await;

        assert!(matches!(bad_email, Err(ServiceError::Validation(_))));
        assert!(matches!(short_password, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn change_password_requires_old_password() {
        let backend = TestBackend::new();
        let user = backend.seed_user("alice", "alice@example.com", "secret1", "USER").await;
        let deps = backend.dependencies();

        let wrong_old = deps
            .user_service
            .change_password(
                &session_of(&user),
                &ChangePasswordRequest {
                    old_password: "nope".into(),
                    new_password: "another1".into(),
                },
            )
            .await;
        assert!(matches!(wrong_old, Err(ServiceError::Validation(_))));

        deps.user_service
            .change_password(
                &session_of(&user),
                &ChangePasswordRequest {
                    old_password: "secret1".into(),
                    new_password: "another1".into(),
                },
            )
            .await
            .unwrap();

        let stored = backend.user_by_name("alice").await.unwrap();
        assert!(
            backend
                .hashing()
                .compare_password(&stored.password, "another1")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn change_email_rejects_address_of_another_user() {
        let backend = TestBackend::new();
        let alice = backend.seed_user("alice", "alice@example.com", "secret1", "USER").await;
        backend.seed_user("bob", "bob@example.com", "secret1", "USER").await;
        let deps = backend.dependencies();

        let taken = deps
            .user_service
            .change_email(
                &session_of(&alice),
                &ChangeEmailRequest {
                    new_email: "bob@example.com".into(),
                },
            )
            .await;
        assert!(matches!(taken, Err(ServiceError::Validation(_))));

        let changed = deps
            .user_service
            .change_email(
                &session_of(&alice),
                &ChangeEmailRequest {
                    new_email: "alice@music.shop".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(changed.data.email, "alice@music.shop");
    }

    #[tokio::test]
    async fn change_role_of_missing_user_is_not_found() {
        let backend = TestBackend::new();
        let deps = backend.dependencies();

        let result = deps
            .user_service
            .change_role(
                42,
                &ChangeRoleRequest {
                    role: "ADMIN".into(),
                },
            )
            .await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let backend = TestBackend::new();
        let deps = backend.dependencies();

        deps.user_service
            .ensure_admin("root", "root@example.com", "rootpass")
            .await
            .unwrap();
        deps.user_service
            .ensure_admin("root", "root@example.com", "rootpass")
            .await
            .unwrap();

        let users = deps.user_service.find_all().await.unwrap().data;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, "ADMIN");
    }
}
