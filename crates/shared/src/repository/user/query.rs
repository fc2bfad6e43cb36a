use crate::{
    abstract_trait::UserQueryRepositoryTrait, config::ConnectionPool, errors::RepositoryError,
    model::User as UserModel,
};
use async_trait::async_trait;
use tracing::error;

pub struct UserQueryRepository {
    db: ConnectionPool,
}

impl UserQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }

    async fn find_one(&self, sql: &str, value: &str) -> Result<Option<UserModel>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, UserModel>(sql)
            .bind(value)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|err| {
                error!("❌ Failed to look up user by {value}: {:?}", err);
                RepositoryError::from(err)
            })
    }
}

#[async_trait]
impl UserQueryRepositoryTrait for UserQueryRepository {
    async fn find_all(&self) -> Result<Vec<UserModel>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, UserModel>(
            "SELECT id, username, email, password, role FROM users ORDER BY id",
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(RepositoryError::from)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserModel>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, UserModel>(
            "SELECT id, username, email, password, role FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(RepositoryError::from)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, RepositoryError> {
        self.find_one(
            "SELECT id, username, email, password, role FROM users WHERE username = $1",
            username,
        )
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, RepositoryError> {
        self.find_one(
            "SELECT id, username, email, password, role FROM users WHERE email = $1",
            email,
        )
        .await
    }
}
