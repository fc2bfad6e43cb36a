use crate::{
    abstract_trait::UserCommandRepositoryTrait,
    config::ConnectionPool,
    domain::requests::CreateUserRequest,
    errors::RepositoryError,
    model::User as UserModel,
};
use async_trait::async_trait;
use tracing::{error, info};

pub struct UserCommandRepository {
    db: ConnectionPool,
}

impl UserCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserCommandRepositoryTrait for UserCommandRepository {
    async fn create_user(&self, req: &CreateUserRequest) -> Result<UserModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let user = sqlx::query_as::<_, UserModel>(
            r#"
            INSERT INTO users (username, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password, role
            "#,
        )
        .bind(&req.username)
        .bind(&req.email)
        .bind(&req.password)
        .bind(&req.role)
        .fetch_one(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to create user {}: {:?}", req.username, err);
            RepositoryError::from_unique(err, "username or email")
        })?;

        info!("✅ Created user ID {} ({})", user.id, user.username);
        Ok(user)
    }

    async fn update_password(&self, id: i64, password: &str) -> Result<(), RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let result = sqlx::query("UPDATE users SET password = $2 WHERE id = $1")
            .bind(id)
            .bind(password)
            .execute(&mut *conn)
            .await
            .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        info!("🔑 Updated password of user ID {id}");
        Ok(())
    }

    async fn update_email(&self, id: i64, email: &str) -> Result<UserModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let user = sqlx::query_as::<_, UserModel>(
            r#"
            UPDATE users SET email = $2
            WHERE id = $1
            RETURNING id, username, email, password, role
            "#,
        )
        .bind(id)
        .bind(email)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|err| RepositoryError::from_unique(err, "email"))?
        .ok_or(RepositoryError::NotFound)?;

        info!("📧 Updated email of user ID {id}");
        Ok(user)
    }

    async fn update_role(&self, id: i64, role: &str) -> Result<UserModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let user = sqlx::query_as::<_, UserModel>(
            r#"
            UPDATE users SET role = $2
            WHERE id = $1
            RETURNING id, username, email, password, role
            "#,
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&mut *conn)
        .await
        .map_err(RepositoryError::from)?
        .ok_or(RepositoryError::NotFound)?;

        info!("🛡️ User ID {id} now has role {role}");
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> Result<(), RepositoryError> {
        let mut tx = self.db.begin().await.map_err(RepositoryError::from)?;

        sqlx::query(
            "DELETE FROM cart_items WHERE cart_id IN (SELECT id FROM carts WHERE user_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        sqlx::query("DELETE FROM carts WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

        sqlx::query(
            "DELETE FROM order_products WHERE order_id IN (SELECT id FROM orders WHERE user_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        sqlx::query("DELETE FROM orders WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await.map_err(RepositoryError::from)?;

        info!("🗑️ Deleted user ID {id} with cart and orders");
        Ok(())
    }
}
