use crate::{
    abstract_trait::{
        CartServiceTrait, DynCartCommandRepository, DynCartQueryRepository,
        DynProductQueryRepository,
    },
    domain::responses::{ApiResponse, CartResponse},
    errors::ServiceError,
    model::{Cart, CartLine},
    utils::{Method, ServiceTracer},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use tracing::info;

/// What adding one unit of a product does to a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartChange {
    Increment { item_id: i64 },
    Insert,
}

/// Scans the cart for the product: an existing line gets one more unit,
/// otherwise a new line with quantity 1 is needed.
pub fn merge_item(lines: &[CartLine], product_id: i64) -> CartChange {
    lines
        .iter()
        .find(|line| line.product.id == product_id)
        .map(|line| CartChange::Increment { item_id: line.item_id })
        .unwrap_or(CartChange::Insert)
}

pub fn cart_total(lines: &[CartLine]) -> f64 {
    lines
        .iter()
        .map(|line| line.product.price * f64::from(line.quantity))
        .sum()
}

pub struct CartService {
    query: DynCartQueryRepository,
    command: DynCartCommandRepository,
    products: DynProductQueryRepository,
    tracer: ServiceTracer,
}

pub struct CartServiceDeps {
    pub query: DynCartQueryRepository,
    pub command: DynCartCommandRepository,
    pub products: DynProductQueryRepository,
}

impl CartService {
    pub fn new(deps: CartServiceDeps, registry: &mut Registry) -> Self {
        let CartServiceDeps {
            query,
            command,
            products,
        } = deps;

        Self {
            query,
            command,
            products,
            tracer: ServiceTracer::new("cart-service", registry),
        }
    }

    async fn view(&self, cart: Cart) -> Result<CartResponse, ServiceError> {
        let lines = self.query.find_lines(cart.id).await?;
        let total = cart_total(&lines);

        Ok(CartResponse::new(cart, lines, total))
    }

    async fn do_add(&self, user_id: i64, product_id: i64) -> Result<CartResponse, ServiceError> {
        self.products
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".into()))?;

        let cart = self.command.get_or_create(user_id).await?;
        let lines = self.query.find_lines(cart.id).await?;

        match merge_item(&lines, product_id) {
            CartChange::Increment { item_id } => {
                self.command.increment_quantity(item_id).await?;
            }
            CartChange::Insert => {
                self.command.insert_item(cart.id, product_id, 1).await?;
            }
        }

        self.view(cart).await
    }

    async fn do_remove(&self, user_id: i64, item_id: i64) -> Result<CartResponse, ServiceError> {
        let cart = self.command.get_or_create(user_id).await?;

        if !self.command.delete_item(cart.id, item_id).await? {
            return Err(ServiceError::NotFound("Cart item not found".into()));
        }

        self.view(cart).await
    }

    async fn do_clear(&self, user_id: i64) -> Result<CartResponse, ServiceError> {
        let cart = self.command.get_or_create(user_id).await?;
        self.command.clear(cart.id).await?;

        self.view(cart).await
    }
}

#[async_trait]
impl CartServiceTrait for CartService {
    async fn get_cart(&self, user_id: i64) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let cart = self.command.get_or_create(user_id).await?;
        let view = self.view(cart).await?;

        Ok(ApiResponse::success("Cart retrieved successfully", view))
    }

    async fn add_product(
        &self,
        user_id: i64,
        product_id: i64,
    ) -> Result<ApiResponse<CartResponse>, ServiceError> {
        info!("🛒 Adding product {product_id} to cart of user {user_id}");

        let tracing_ctx = self.tracer.start_tracing(
            "add_to_cart",
            vec![
                KeyValue::new("component", "cart"),
                KeyValue::new("user_id", user_id),
                KeyValue::new("product_id", product_id),
            ],
        );

        match self.do_add(user_id, product_id).await {
            Ok(view) => {
                self.tracer.complete_tracing_success(
                    &tracing_ctx,
                    Method::Post,
                    "Product added to cart",
                );
                Ok(ApiResponse::success("Product added to cart", view))
            }
            Err(e) => {
                self.tracer.complete_tracing_error(
                    &tracing_ctx,
                    Method::Post,
                    &format!("Failed to add product {product_id} to cart: {e}"),
                );
                Err(e)
            }
        }
    }

    async fn remove_item(
        &self,
        user_id: i64,
        item_id: i64,
    ) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let tracing_ctx = self.tracer.start_tracing(
            "remove_from_cart",
            vec![
                KeyValue::new("component", "cart"),
                KeyValue::new("user_id", user_id),
                KeyValue::new("cart_item_id", item_id),
            ],
        );

        match self.do_remove(user_id, item_id).await {
            Ok(view) => {
                self.tracer.complete_tracing_success(
                    &tracing_ctx,
                    Method::Delete,
                    "Item removed from cart",
                );
                Ok(ApiResponse::success("Product removed from cart", view))
            }
            Err(e) => {
                self.tracer.complete_tracing_error(
                    &tracing_ctx,
                    Method::Delete,
                    &format!("Failed to remove cart item {item_id}: {e}"),
                );
                Err(e)
            }
        }
    }

    async fn clear_cart(&self, user_id: i64) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let tracing_ctx = self.tracer.start_tracing(
            "clear_cart",
            vec![
                KeyValue::new("component", "cart"),
                KeyValue::new("user_id", user_id),
            ],
        );

        match self.do_clear(user_id).await {
            Ok(view) => {
                self.tracer
                    .complete_tracing_success(&tracing_ctx, Method::Delete, "Cart cleared");
                Ok(ApiResponse::success("Cart cleared", view))
            }
            Err(e) => {
                self.tracer.complete_tracing_error(
                    &tracing_ctx,
                    Method::Delete,
                    &format!("Failed to clear cart of user {user_id}: {e}"),
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{abstract_trait::CartCommandRepositoryTrait, model::Product, testing::TestBackend};

    fn line(item_id: i64, product_id: i64, price: f64, quantity: i32) -> CartLine {
        CartLine {
            item_id,
            quantity,
            product: Product {
                id: product_id,
                name: format!("product-{product_id}"),
                image: None,
                category: None,
                brand: None,
                price,
                in_stock: true,
                description: None,
            },
        }
    }

    #[test]
    fn merge_increments_existing_line() {
        let lines = vec![line(1, 10, 5.0, 1), line(2, 20, 7.5, 3)];

        assert_eq!(
            merge_item(&lines, 20),
            CartChange::Increment { item_id: 2 }
        );
        assert_eq!(merge_item(&lines, 30), CartChange::Insert);
    }

    #[test]
    fn total_weights_price_by_quantity() {
        let lines = vec![line(1, 10, 5.0, 2), line(2, 20, 7.5, 1)];
        assert_eq!(cart_total(&lines), 17.5);
        assert_eq!(cart_total(&[]), 0.0);
    }

    #[tokio::test]
    async fn adding_same_product_twice_increments_quantity() {
        let backend = TestBackend::new();
        let user = backend.seed_user("alice", "alice@example.com", "secret1", "USER").await;
        let product = backend.seed_product("Strat", 999.0, Some("Guitars"), Some("Fender")).await;
        let deps = backend.dependencies();

        deps.cart_service.add_product(user.id, product.id).await.unwrap();
        let cart = deps.cart_service.add_product(user.id, product.id).await.unwrap().data;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(cart.total_price, 1998.0);
    }

    #[tokio::test]
    async fn increments_build_on_the_stored_quantity() {
        let backend = TestBackend::new();
        let user = backend.seed_user("alice", "alice@example.com", "secret1", "USER").await;
        let product = backend.seed_product("Strat", 999.0, None, None).await;
        let cart = backend.store.get_or_create(user.id).await.unwrap();
        let item = backend.store.insert_item(cart.id, product.id, 1).await.unwrap();

        // Two writers that both saw quantity 1.
        backend.store.increment_quantity(item.id).await.unwrap();
        let item = backend.store.increment_quantity(item.id).await.unwrap();

        assert_eq!(item.quantity, 3);
    }

    #[tokio::test]
    async fn adding_unknown_product_is_not_found() {
        let backend = TestBackend::new();
        let user = backend.seed_user("alice", "alice@example.com", "secret1", "USER").await;
        let deps = backend.dependencies();

        let result = deps.cart_service.add_product(user.id, 404).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn cart_is_created_once_per_user() {
        let backend = TestBackend::new();
        let user = backend.seed_user("alice", "alice@example.com", "secret1", "USER").await;
        let deps = backend.dependencies();

        let first = deps.cart_service.get_cart(user.id).await.unwrap().data;
        let second = deps.cart_service.get_cart(user.id).await.unwrap().data;

        assert_eq!(first.id, second.id);
        assert!(first.items.is_empty());
    }

    #[tokio::test]
    async fn remove_only_touches_own_cart() {
        let backend = TestBackend::new();
        let alice = backend.seed_user("alice", "alice@example.com", "secret1", "USER").await;
        let bob = backend.seed_user("bob", "bob@example.com", "secret1", "USER").await;
        let product = backend.seed_product("Strat", 999.0, None, None).await;
        let deps = backend.dependencies();

        let cart = deps.cart_service.add_product(alice.id, product.id).await.unwrap().data;
        let item_id = cart.items[0].id;

        let foreign = deps.cart_service.remove_item(bob.id, item_id).await;
        assert!(matches!(foreign, Err(ServiceError::NotFound(_))));

        let cart = deps.cart_service.remove_item(alice.id, item_id).await.unwrap().data;
        assert!(cart.items.is_empty());
    }

    #[tokio::test]
    async fn clear_empties_the_cart() {
        let backend = TestBackend::new();
        let user = backend.seed_user("alice", "alice@example.com", "secret1", "USER").await;
        let a = backend.seed_product("Strat", 999.0, None, None).await;
        let b = backend.seed_product("Pick", 1.0, None, None).await;
        let deps = backend.dependencies();

        deps.cart_service.add_product(user.id, a.id).await.unwrap();
        deps.cart_service.add_product(user.id, b.id).await.unwrap();

        let cart = deps.cart_service.clear_cart(user.id).await.unwrap().data;
        assert!(cart.items.is_empty());
        assert_eq!(cart.total_price, 0.0);
    }
}
