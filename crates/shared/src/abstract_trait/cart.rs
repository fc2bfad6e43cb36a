use crate::{
    domain::responses::{ApiResponse, CartResponse},
    errors::{RepositoryError, ServiceError},
    model::{Cart, CartItem, CartLine},
};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynCartQueryRepository = Arc<dyn CartQueryRepositoryTrait + Send + Sync>;
pub type DynCartCommandRepository = Arc<dyn CartCommandRepositoryTrait + Send + Sync>;
pub type DynCartService = Arc<dyn CartServiceTrait + Send + Sync>;

#[async_trait]
pub trait CartQueryRepositoryTrait {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Cart>, RepositoryError>;
    /// Items of the cart joined with their products, oldest first.
    async fn find_lines(&self, cart_id: i64) -> Result<Vec<CartLine>, RepositoryError>;
}

#[async_trait]
pub trait CartCommandRepositoryTrait {
    /// Returns the user's cart, inserting it when absent. Concurrent callers
    /// converge on the same row.
    async fn get_or_create(&self, user_id: i64) -> Result<Cart, RepositoryError>;
    async fn insert_item(
        &self,
        cart_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError>;
    /// Adds one unit to the stored quantity of the item.
    async fn increment_quantity(&self, item_id: i64) -> Result<CartItem, RepositoryError>;
    /// Returns false when no item with that id belongs to the cart.
    async fn delete_item(&self, cart_id: i64, item_id: i64) -> Result<bool, RepositoryError>;
    async fn clear(&self, cart_id: i64) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait CartServiceTrait {
    async fn get_cart(&self, user_id: i64) -> Result<ApiResponse<CartResponse>, ServiceError>;
    async fn add_product(
        &self,
        user_id: i64,
        product_id: i64,
    ) -> Result<ApiResponse<CartResponse>, ServiceError>;
    async fn remove_item(
        &self,
        user_id: i64,
        item_id: i64,
    ) -> Result<ApiResponse<CartResponse>, ServiceError>;
    async fn clear_cart(&self, user_id: i64) -> Result<ApiResponse<CartResponse>, ServiceError>;
}
