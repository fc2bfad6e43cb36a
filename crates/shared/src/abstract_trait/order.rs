use crate::{
    domain::responses::{ApiResponse, OrderCountByUser, OrderResponse, TotalPriceByUser},
    errors::{RepositoryError, ServiceError},
    model::{Order, OrderProduct, OrderSummary},
};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynOrderQueryRepository = Arc<dyn OrderQueryRepositoryTrait + Send + Sync>;
pub type DynOrderCommandRepository = Arc<dyn OrderCommandRepositoryTrait + Send + Sync>;
pub type DynOrderService = Arc<dyn OrderServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderQueryRepositoryTrait {
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Order>, RepositoryError>;
    /// Products of the given orders, ordered by order id then position.
    async fn find_products(&self, order_ids: &[i64]) -> Result<Vec<OrderProduct>, RepositoryError>;
    async fn find_summaries(&self) -> Result<Vec<OrderSummary>, RepositoryError>;
}

#[async_trait]
pub trait OrderCommandRepositoryTrait {
    /// Inserts the order with its flattened product list and removes the
    /// ordered cart items, all or nothing. Items added to the cart after
    /// `item_ids` was read stay in the cart.
    async fn create_from_cart(
        &self,
        user_id: i64,
        cart_id: i64,
        item_ids: &[i64],
        product_ids: &[i64],
        total_price: f64,
    ) -> Result<Order, RepositoryError>;
}

#[async_trait]
pub trait OrderServiceTrait {
    async fn checkout(&self, user_id: i64) -> Result<ApiResponse<OrderResponse>, ServiceError>;
    async fn find_by_user(
        &self,
        user_id: i64,
    ) -> Result<ApiResponse<Vec<OrderResponse>>, ServiceError>;
    async fn orders_count_by_user(
        &self,
    ) -> Result<ApiResponse<Vec<OrderCountByUser>>, ServiceError>;
    async fn total_price_by_user(
        &self,
    ) -> Result<ApiResponse<Vec<TotalPriceByUser>>, ServiceError>;
}
