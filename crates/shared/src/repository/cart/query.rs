use crate::{
    abstract_trait::CartQueryRepositoryTrait,
    config::ConnectionPool,
    errors::RepositoryError,
    model::{Cart, CartLine},
};
use async_trait::async_trait;
use tracing::error;

pub struct CartQueryRepository {
    db: ConnectionPool,
}

impl CartQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CartQueryRepositoryTrait for CartQueryRepository {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Cart>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, Cart>("SELECT id, user_id FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(RepositoryError::from)
    }

    async fn find_lines(&self, cart_id: i64) -> Result<Vec<CartLine>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, CartLine>(
            r#"
            SELECT ci.id AS item_id, ci.quantity,
                   p.id, p.name, p.image, p.category, p.brand, p.price, p.in_stock, p.description
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_id = $1
            ORDER BY ci.id
            "#,
        )
        .bind(cart_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to load items of cart {cart_id}: {:?}", err);
            RepositoryError::from(err)
        })
    }
}
