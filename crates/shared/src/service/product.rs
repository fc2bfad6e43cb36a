use crate::{
    abstract_trait::{
        DynCacheStore, DynProductCommandRepository, DynProductQueryRepository,
        ProductServiceTrait,
    },
    cache::{get_from_cache, set_to_cache},
    domain::{
        requests::{CreateProductRequest, UpdateProductRequest},
        responses::{ApiResponse, ProductResponse},
    },
    errors::{RepositoryError, ServiceError},
    utils::{Method, ServiceTracer},
};
use async_trait::async_trait;
use chrono::Duration;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use std::collections::BTreeSet;
use tracing::info;
use validator::Validate;

const CACHE_ALL_KEY: &str = "product:find_all";

fn cache_key_by_id(id: i64) -> String {
    format!("product:find_by_id:{id}")
}

/// Distinct non-empty values, sorted.
pub fn distinct_values<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Vec<String> {
    values
        .into_iter()
        .flatten()
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn not_found(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound => ServiceError::NotFound("Product not found".into()),
        other => ServiceError::Repo(other),
    }
}

pub struct ProductService {
    query: DynProductQueryRepository,
    command: DynProductCommandRepository,
    cache: DynCacheStore,
    tracer: ServiceTracer,
}

pub struct ProductServiceDeps {
    pub query: DynProductQueryRepository,
    pub command: DynProductCommandRepository,
    pub cache: DynCacheStore,
}

impl ProductService {
    pub fn new(deps: ProductServiceDeps, registry: &mut Registry) -> Self {
        let ProductServiceDeps {
            query,
            command,
            cache,
        } = deps;

        Self {
            query,
            command,
            cache,
            tracer: ServiceTracer::new("product-service", registry),
        }
    }

    async fn load_all(&self) -> Result<Vec<ProductResponse>, ServiceError> {
        if let Some(cached) = get_from_cache::<Vec<ProductResponse>>(&self.cache, CACHE_ALL_KEY).await
        {
            info!("✅ Found {} products in cache", cached.len());
            return Ok(cached);
        }

        let products: Vec<ProductResponse> = self
            .query
            .find_all()
            .await?
            .into_iter()
            .map(ProductResponse::from)
            .collect();

        set_to_cache(&self.cache, CACHE_ALL_KEY, &products, Duration::minutes(5)).await;

        Ok(products)
    }

    async fn invalidate(&self, id: Option<i64>) {
        self.cache.delete_from_cache(CACHE_ALL_KEY).await;
        if let Some(id) = id {
            self.cache.delete_from_cache(&cache_key_by_id(id)).await;
        }
    }
}

#[async_trait]
impl ProductServiceTrait for ProductService {
    async fn find_all(&self) -> Result<ApiResponse<Vec<ProductResponse>>, ServiceError> {
        let tracing_ctx = self.tracer.start_tracing(
            "product_find_all",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("operation", "find_all"),
            ],
        );

        match self.load_all().await {
            Ok(products) => {
                self.tracer.complete_tracing_success(
                    &tracing_ctx,
                    Method::Get,
                    "Products retrieved",
                );
                Ok(ApiResponse::success("Products retrieved successfully", products))
            }
            Err(e) => {
                self.tracer.complete_tracing_error(
                    &tracing_ctx,
                    Method::Get,
                    &format!("Failed to fetch all products: {e}"),
                );
                Err(e)
            }
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        let tracing_ctx = self.tracer.start_tracing(
            "product_find_by_id",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product_id", id),
            ],
        );

        let cache_key = cache_key_by_id(id);

        if let Some(cached) = get_from_cache::<ProductResponse>(&self.cache, &cache_key).await {
            self.tracer.complete_tracing_success(
                &tracing_ctx,
                Method::Get,
                "Product retrieved from cache",
            );
            return Ok(ApiResponse::success("Product retrieved successfully", cached));
        }

        let product = match self.query.find_by_id(id).await {
            Ok(Some(product)) => ProductResponse::from(product),
            Ok(None) => {
                self.tracer.complete_tracing_error(
                    &tracing_ctx,
                    Method::Get,
                    &format!("Product {id} not found"),
                );
                return Err(ServiceError::NotFound("Product not found".into()));
            }
            Err(e) => {
                self.tracer.complete_tracing_error(
                    &tracing_ctx,
                    Method::Get,
                    &format!("Failed to fetch product {id}: {e}"),
                );
                return Err(ServiceError::Repo(e));
            }
        };

        set_to_cache(&self.cache, &cache_key, &product, Duration::minutes(5)).await;

        self.tracer
            .complete_tracing_success(&tracing_ctx, Method::Get, "Product retrieved from DB");

        Ok(ApiResponse::success("Product retrieved successfully", product))
    }

    async fn categories(&self) -> Result<ApiResponse<Vec<String>>, ServiceError> {
        let products = self.load_all().await?;
        let categories = distinct_values(products.iter().map(|p| p.category.as_deref()));

        Ok(ApiResponse::success("Categories retrieved successfully", categories))
    }

    async fn brands(&self) -> Result<ApiResponse<Vec<String>>, ServiceError> {
        let products = self.load_all().await?;
        let brands = distinct_values(products.iter().map(|p| p.brand.as_deref()));

        Ok(ApiResponse::success("Brands retrieved successfully", brands))
    }

    async fn create_product(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        req.validate()?;

        let tracing_ctx = self.tracer.start_tracing(
            "create_product",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("name", req.name.clone()),
            ],
        );

        let product = match self.command.create_product(req).await {
            Ok(product) => product,
            Err(e) => {
                self.tracer.complete_tracing_error(
                    &tracing_ctx,
                    Method::Post,
                    &format!("Failed to create product: {e}"),
                );
                return Err(ServiceError::Repo(e));
            }
        };

        self.invalidate(None).await;

        self.tracer
            .complete_tracing_success(&tracing_ctx, Method::Post, "Product created");

        Ok(ApiResponse::success(
            "Product created successfully",
            ProductResponse::from(product),
        ))
    }

    async fn update_product(
        &self,
        req: &UpdateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        req.validate()?;

        let tracing_ctx = self.tracer.start_tracing(
            "update_product",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product_id", req.id),
            ],
        );

        let product = match self.command.update_product(req).await {
            Ok(product) => product,
            Err(e) => {
                self.tracer.complete_tracing_error(
                    &tracing_ctx,
                    Method::Put,
                    &format!("Failed to update product {}: {e}", req.id),
                );
                return Err(not_found(e));
            }
        };

        self.invalidate(Some(product.id)).await;

        self.tracer
            .complete_tracing_success(&tracing_ctx, Method::Put, "Product updated");

        Ok(ApiResponse::success(
            "Product updated successfully",
            ProductResponse::from(product),
        ))
    }

    async fn delete_product(&self, id: i64) -> Result<ApiResponse<()>, ServiceError> {
        let tracing_ctx = self.tracer.start_tracing(
            "delete_product",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product_id", id),
            ],
        );

        if let Err(e) = self.command.delete_product(id).await {
            self.tracer.complete_tracing_error(
                &tracing_ctx,
                Method::Delete,
                &format!("Failed to delete product {id}: {e}"),
            );
            return Err(not_found(e));
        }

        self.invalidate(Some(id)).await;

        self.tracer
            .complete_tracing_success(&tracing_ctx, Method::Delete, "Product deleted");

        Ok(ApiResponse::success("Product deleted successfully", ()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestBackend;

    #[test]
    fn distinct_values_skips_empty_and_sorts() {
        let values = vec![Some("Guitars"), None, Some(""), Some("Drums"), Some("Guitars")];
        assert_eq!(distinct_values(values), vec!["Drums", "Guitars"]);
    }

    #[tokio::test]
    async fn categories_and_brands_come_from_catalog() {
        let backend = TestBackend::new();
        backend.seed_product("Strat", 999.0, Some("Guitars"), Some("Fender")).await;
        backend.seed_product("Les Paul", 1999.0, Some("Guitars"), Some("Gibson")).await;
        backend.seed_product("Cable", 9.5, None, Some("")).await;
        let deps = backend.dependencies();

        let categories = deps.product_service.categories().await.unwrap().data;
        let brands = deps.product_service.brands().await.unwrap().data;

        assert_eq!(categories, vec!["Guitars"]);
        assert_eq!(brands, vec!["Fender", "Gibson"]);
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let backend = TestBackend::new();
        let deps = backend.dependencies();

        let result = deps.product_service.find_by_id(7).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));

        let result = deps.product_service.delete_product(7).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn writes_invalidate_cached_catalog() {
        let backend = TestBackend::new();
        backend.seed_product("Strat", 999.0, Some("Guitars"), Some("Fender")).await;
        let deps = backend.dependencies();

        assert_eq!(deps.product_service.find_all().await.unwrap().data.len(), 1);
        assert!(backend.cache.contains(CACHE_ALL_KEY));

        deps.product_service
            .create_product(&CreateProductRequest {
                name: "Kit".into(),
                image: None,
                category: Some("Drums".into()),
                brand: Some("Pearl".into()),
                price: 450.0,
                in_stock: true,
                description: None,
            })
            .await
            .unwrap();

        assert!(!backend.cache.contains(CACHE_ALL_KEY));
        assert_eq!(deps.product_service.find_all().await.unwrap().data.len(), 2);
    }

    #[tokio::test]
    async fn create_rejects_negative_price() {
        let backend = TestBackend::new();
        let deps = backend.dependencies();

        let result = deps
            .product_service
            .create_product(&CreateProductRequest {
                name: "Broken".into(),
                image: None,
                category: None,
                brand: None,
                price: -1.0,
                in_stock: true,
                description: None,
            })
            .await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
