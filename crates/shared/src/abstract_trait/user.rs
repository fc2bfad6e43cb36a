use crate::{
    cache::Session,
    domain::{
        requests::{
            ChangeEmailRequest, ChangePasswordRequest, ChangeRoleRequest, CreateUserRequest,
            RegisterRequest,
        },
        responses::{ApiResponse, UserResponse},
    },
    errors::{RepositoryError, ServiceError},
    model::User,
};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynUserQueryRepository = Arc<dyn UserQueryRepositoryTrait + Send + Sync>;
pub type DynUserCommandRepository = Arc<dyn UserCommandRepositoryTrait + Send + Sync>;
pub type DynUserService = Arc<dyn UserServiceTrait + Send + Sync>;

#[async_trait]
pub trait UserQueryRepositoryTrait {
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
}

#[async_trait]
pub trait UserCommandRepositoryTrait {
    async fn create_user(&self, req: &CreateUserRequest) -> Result<User, RepositoryError>;
    async fn update_password(&self, id: i64, password: &str) -> Result<(), RepositoryError>;
    async fn update_email(&self, id: i64, email: &str) -> Result<User, RepositoryError>;
    async fn update_role(&self, id: i64, role: &str) -> Result<User, RepositoryError>;
    /// Removes the user's cart, orders and the user row itself.
    async fn delete_user(&self, id: i64) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait UserServiceTrait {
    async fn register(
        &self,
        req: &RegisterRequest,
    ) -> Result<ApiResponse<UserResponse>, ServiceError>;
    async fn me(&self, session: &Session) -> Result<ApiResponse<UserResponse>, ServiceError>;
    async fn change_password(
        &self,
        session: &Session,
        req: &ChangePasswordRequest,
    ) -> Result<ApiResponse<()>, ServiceError>;
    async fn change_email(
        &self,
        session: &Session,
        req: &ChangeEmailRequest,
    ) -> Result<ApiResponse<UserResponse>, ServiceError>;
    async fn find_all(&self) -> Result<ApiResponse<Vec<UserResponse>>, ServiceError>;
    async fn change_role(
        &self,
        user_id: i64,
        req: &ChangeRoleRequest,
    ) -> Result<ApiResponse<UserResponse>, ServiceError>;
    async fn delete_user(&self, user_id: i64) -> Result<ApiResponse<()>, ServiceError>;
    /// Creates an ADMIN account unless the username is already taken.
    async fn ensure_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ServiceError>;
}
