use crate::{
    domain::{
        requests::{CreateProductRequest, UpdateProductRequest},
        responses::{ApiResponse, ProductResponse},
    },
    errors::{RepositoryError, ServiceError},
    model::Product,
};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynProductQueryRepository = Arc<dyn ProductQueryRepositoryTrait + Send + Sync>;
pub type DynProductCommandRepository = Arc<dyn ProductCommandRepositoryTrait + Send + Sync>;
pub type DynProductService = Arc<dyn ProductServiceTrait + Send + Sync>;

#[async_trait]
pub trait ProductQueryRepositoryTrait {
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, RepositoryError>;
}

#[async_trait]
pub trait ProductCommandRepositoryTrait {
    async fn create_product(&self, req: &CreateProductRequest) -> Result<Product, RepositoryError>;
    async fn update_product(&self, req: &UpdateProductRequest) -> Result<Product, RepositoryError>;
    /// Detaches the product from every cart and order, then deletes it.
    async fn delete_product(&self, id: i64) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ProductServiceTrait {
    async fn find_all(&self) -> Result<ApiResponse<Vec<ProductResponse>>, ServiceError>;
    async fn find_by_id(&self, id: i64) -> Result<ApiResponse<ProductResponse>, ServiceError>;
    async fn categories(&self) -> Result<ApiResponse<Vec<String>>, ServiceError>;
    async fn brands(&self) -> Result<ApiResponse<Vec<String>>, ServiceError>;
    async fn create_product(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError>;
    async fn update_product(
        &self,
        req: &UpdateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError>;
    async fn delete_product(&self, id: i64) -> Result<ApiResponse<()>, ServiceError>;
}
