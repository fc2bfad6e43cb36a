use crate::{
    abstract_trait::ProductQueryRepositoryTrait, config::ConnectionPool, errors::RepositoryError,
    model::Product as ProductModel,
};
use async_trait::async_trait;
use tracing::{error, info};

pub struct ProductQueryRepository {
    db: ConnectionPool,
}

impl ProductQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductQueryRepositoryTrait for ProductQueryRepository {
    async fn find_all(&self) -> Result<Vec<ProductModel>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let products = sqlx::query_as::<_, ProductModel>(
            r#"
            SELECT id, name, image, category, brand, price, in_stock, description
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to fetch products: {:?}", err);
            RepositoryError::from(err)
        })?;

        info!("✅ Found {} products", products.len());
        Ok(products)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ProductModel>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, ProductModel>(
            r#"
            SELECT id, name, image, category, brand, price, in_stock, description
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to fetch product ID {id}: {:?}", err);
            RepositoryError::from(err)
        })
    }
}
