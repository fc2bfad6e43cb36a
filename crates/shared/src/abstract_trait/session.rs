use crate::{
    cache::Session,
    domain::requests::LoginRequest,
    errors::ServiceError,
};
use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;

pub type DynSessionStore = Arc<dyn SessionStoreTrait + Send + Sync>;
pub type DynAuthService = Arc<dyn AuthServiceTrait + Send + Sync>;

#[async_trait]
pub trait SessionStoreTrait {
    async fn create_session(&self, session_id: &str, session: &Session, ttl: Duration) -> bool;
    async fn get_session(&self, session_id: &str) -> Option<Session>;
    async fn refresh_session(&self, session_id: &str, ttl: Duration) -> bool;
    async fn delete_session(&self, session_id: &str) -> bool;

    async fn get_user_session(&self, user_id: i64) -> Option<String>;
    async fn set_user_session(&self, user_id: i64, session_id: &str, ttl: Duration) -> bool;
    async fn delete_user_session(&self, user_id: i64) -> bool;
}

#[async_trait]
pub trait AuthServiceTrait {
    /// Returns the new session id together with the stored session.
    async fn login(&self, req: &LoginRequest) -> Result<(String, Session), ServiceError>;
    async fn authenticate(&self, session_id: &str) -> Result<Session, ServiceError>;
    async fn logout(&self, session_id: &str) -> Result<(), ServiceError>;
    async fn revoke_user_sessions(&self, user_id: i64) -> Result<(), ServiceError>;
}
