use crate::{
    abstract_trait::OrderCommandRepositoryTrait, config::ConnectionPool,
    errors::RepositoryError, model::Order,
};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info};

pub struct OrderCommandRepository {
    db: ConnectionPool,
}

impl OrderCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderCommandRepositoryTrait for OrderCommandRepository {
    async fn create_from_cart(
        &self,
        user_id: i64,
        cart_id: i64,
        item_ids: &[i64],
        product_ids: &[i64],
        total_price: f64,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.db.begin().await.map_err(RepositoryError::from)?;

        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (user_id, order_date, total_price)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, order_date, total_price
            "#,
        )
        .bind(user_id)
        .bind(Utc::now().naive_utc())
        .bind(total_price)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            error!("❌ Failed to create order for user {user_id}: {:?}", err);
            RepositoryError::from(err)
        })?;

        let positions: Vec<i32> = (0..product_ids.len() as i32).collect();

        sqlx::query(
            r#"
            INSERT INTO order_products (order_id, product_id, position)
            SELECT $1, product_id, position
            FROM UNNEST($2::BIGINT[], $3::INT[]) AS t(product_id, position)
            "#,
        )
        .bind(order.id)
        .bind(product_ids)
        .bind(&positions)
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND id = ANY($2)")
            .bind(cart_id)
            .bind(item_ids)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

        tx.commit().await.map_err(RepositoryError::from)?;

        info!(
            "✅ Created order ID {} for user {user_id} with {} products",
            order.id,
            product_ids.len()
        );
        Ok(order)
    }
}
