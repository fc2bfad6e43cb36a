use crate::{
    abstract_trait::ProductCommandRepositoryTrait,
    config::ConnectionPool,
    domain::requests::{CreateProductRequest, UpdateProductRequest},
    errors::RepositoryError,
    model::Product as ProductModel,
};
use async_trait::async_trait;
use tracing::{error, info};

pub struct ProductCommandRepository {
    db: ConnectionPool,
}

impl ProductCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductCommandRepositoryTrait for ProductCommandRepository {
    async fn create_product(
        &self,
        product: &CreateProductRequest,
    ) -> Result<ProductModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let result = sqlx::query_as::<_, ProductModel>(
            r#"
            INSERT INTO products (name, image, category, brand, price, in_stock, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, image, category, brand, price, in_stock, description
            "#,
        )
        .bind(&product.name)
        .bind(&product.image)
        .bind(&product.category)
        .bind(&product.brand)
        .bind(product.price)
        .bind(product.in_stock)
        .bind(&product.description)
        .fetch_one(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to create product {}: {:?}", product.name, err);
            RepositoryError::from(err)
        })?;

        info!("✅ Created product ID {} ({})", result.id, result.name);
        Ok(result)
    }

    async fn update_product(
        &self,
        product: &UpdateProductRequest,
    ) -> Result<ProductModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let result = sqlx::query_as::<_, ProductModel>(
            r#"
            UPDATE products
            SET name = $2,
                image = $3,
                category = $4,
                brand = $5,
                price = $6,
                in_stock = $7,
                description = $8
            WHERE id = $1
            RETURNING id, name, image, category, brand, price, in_stock, description
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.image)
        .bind(&product.category)
        .bind(&product.brand)
        .bind(product.price)
        .bind(product.in_stock)
        .bind(&product.description)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to update product ID {}: {:?}", product.id, err);
            RepositoryError::from(err)
        })?
        .ok_or(RepositoryError::NotFound)?;

        info!("🔄 Updated product ID {}", result.id);
        Ok(result)
    }

    async fn delete_product(&self, id: i64) -> Result<(), RepositoryError> {
        let mut tx = self.db.begin().await.map_err(RepositoryError::from)?;

        let cart_rows = sqlx::query("DELETE FROM cart_items WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?
            .rows_affected();

        let order_rows = sqlx::query("DELETE FROM order_products WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?
            .rows_affected();

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|err| {
                error!("❌ Failed to delete product ID {id}: {:?}", err);
                RepositoryError::from(err)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await.map_err(RepositoryError::from)?;

        info!(
            "🗑️ Deleted product ID {id} (removed from {cart_rows} cart items, {order_rows} order lines)"
        );
        Ok(())
    }
}
