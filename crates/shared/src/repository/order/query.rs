use crate::{
    abstract_trait::OrderQueryRepositoryTrait,
    config::ConnectionPool,
    errors::RepositoryError,
    model::{Order, OrderProduct, OrderSummary},
};
use async_trait::async_trait;
use tracing::error;

pub struct OrderQueryRepository {
    db: ConnectionPool,
}

impl OrderQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for OrderQueryRepository {
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Order>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, order_date, total_price
            FROM orders
            WHERE user_id = $1
            ORDER BY order_date, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to fetch orders of user {user_id}: {:?}", err);
            RepositoryError::from(err)
        })
    }

    async fn find_products(&self, order_ids: &[i64]) -> Result<Vec<OrderProduct>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, OrderProduct>(
            r#"
            SELECT op.order_id, op.position,
                   p.id, p.name, p.image, p.category, p.brand, p.price, p.in_stock, p.description
            FROM order_products op
            JOIN products p ON p.id = op.product_id
            WHERE op.order_id = ANY($1)
            ORDER BY op.order_id, op.position
            "#,
        )
        .bind(order_ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(RepositoryError::from)
    }

    async fn find_summaries(&self) -> Result<Vec<OrderSummary>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT o.id AS order_id, u.username, o.total_price
            FROM orders o
            JOIN users u ON u.id = o.user_id
            ORDER BY o.id
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(RepositoryError::from)
    }
}
