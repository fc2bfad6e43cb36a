use crate::{
    abstract_trait::CartCommandRepositoryTrait,
    config::ConnectionPool,
    errors::RepositoryError,
    model::{Cart, CartItem},
};
use async_trait::async_trait;
use tracing::{error, info};

pub struct CartCommandRepository {
    db: ConnectionPool,
}

impl CartCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CartCommandRepositoryTrait for CartCommandRepository {
    async fn get_or_create(&self, user_id: i64) -> Result<Cart, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        // the unique user_id makes a lost race a no-op
        let inserted = sqlx::query(
            "INSERT INTO carts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to create cart for user {user_id}: {:?}", err);
            RepositoryError::from(err)
        })?
        .rows_affected();

        if inserted > 0 {
            info!("🛒 Created cart for user {user_id}");
        }

        sqlx::query_as::<_, Cart>("SELECT id, user_id FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await
            .map_err(RepositoryError::from)
    }

    async fn insert_item(
        &self,
        cart_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, CartItem>(
            r#"
            INSERT INTO cart_items (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING id, cart_id, product_id, quantity
            "#,
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&mut *conn)
        .await
        .map_err(|err| RepositoryError::from_unique(err, "cart item"))
    }

    async fn increment_quantity(&self, item_id: i64) -> Result<CartItem, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, CartItem>(
            r#"
            UPDATE cart_items SET quantity = quantity + 1
            WHERE id = $1
            RETURNING id, cart_id, product_id, quantity
            "#,
        )
        .bind(item_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(RepositoryError::from)?
        .ok_or(RepositoryError::NotFound)
    }

    async fn delete_item(&self, cart_id: i64, item_id: i64) -> Result<bool, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND cart_id = $2")
            .bind(item_id)
            .bind(cart_id)
            .execute(&mut *conn)
            .await
            .map_err(RepositoryError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self, cart_id: i64) -> Result<(), RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *conn)
            .await
            .map_err(RepositoryError::from)?;

        Ok(())
    }
}
