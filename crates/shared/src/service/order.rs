use crate::{
    abstract_trait::{
        DynCartCommandRepository, DynCartQueryRepository, DynOrderCommandRepository,
        DynOrderQueryRepository, DynUserQueryRepository, OrderServiceTrait,
    },
    domain::responses::{ApiResponse, OrderCountByUser, OrderResponse, TotalPriceByUser},
    errors::ServiceError,
    model::{CartLine, OrderSummary, Product},
    service::cart_total,
    utils::{Method, ServiceTracer},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use std::collections::{BTreeMap, HashMap};
use tracing::info;

/// One product entry per purchased unit, in cart order.
pub fn flatten_items(lines: &[CartLine]) -> Vec<Product> {
    lines
        .iter()
        .flat_map(|line| std::iter::repeat_n(&line.product, line.quantity.max(0) as usize))
        .cloned()
        .collect()
}

pub fn count_orders_by_user(summaries: &[OrderSummary]) -> Vec<OrderCountByUser> {
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for summary in summaries {
        *counts.entry(summary.username.as_str()).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(username, order_count)| OrderCountByUser {
            username: username.to_string(),
            order_count,
        })
        .collect()
}

pub fn sum_totals_by_user(summaries: &[OrderSummary]) -> Vec<TotalPriceByUser> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for summary in summaries {
        *totals.entry(summary.username.as_str()).or_default() += summary.total_price;
    }

    totals
        .into_iter()
        .map(|(username, total_price)| TotalPriceByUser {
            username: username.to_string(),
            total_price,
        })
        .collect()
}

pub struct OrderService {
    query: DynOrderQueryRepository,
    command: DynOrderCommandRepository,
    users: DynUserQueryRepository,
    cart_query: DynCartQueryRepository,
    cart_command: DynCartCommandRepository,
    tracer: ServiceTracer,
}

pub struct OrderServiceDeps {
    pub query: DynOrderQueryRepository,
    pub command: DynOrderCommandRepository,
    pub users: DynUserQueryRepository,
    pub cart_query: DynCartQueryRepository,
    pub cart_command: DynCartCommandRepository,
}

impl OrderService {
    pub fn new(deps: OrderServiceDeps, registry: &mut Registry) -> Self {
        let OrderServiceDeps {
            query,
            command,
            users,
            cart_query,
            cart_command,
        } = deps;

        Self {
            query,
            command,
            users,
            cart_query,
            cart_command,
            tracer: ServiceTracer::new("order-service", registry),
        }
    }

    async fn do_checkout(&self, user_id: i64) -> Result<OrderResponse, ServiceError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".into()))?;

        let cart = self.cart_command.get_or_create(user_id).await?;
        let lines = self.cart_query.find_lines(cart.id).await?;

        if lines.is_empty() {
            return Err(ServiceError::validation("Cart is empty"));
        }

        let item_ids: Vec<i64> = lines.iter().map(|line| line.item_id).collect();
        let products = flatten_items(&lines);
        let product_ids: Vec<i64> = products.iter().map(|p| p.id).collect();
        let total_price = cart_total(&lines);

        let order = self
            .command
            .create_from_cart(user_id, cart.id, &item_ids, &product_ids, total_price)
            .await?;

        Ok(OrderResponse::new(order, products))
    }

    async fn do_find_by_user(&self, user_id: i64) -> Result<Vec<OrderResponse>, ServiceError> {
        let orders = self.query.find_by_user(user_id).await?;
        let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();

        let mut products: HashMap<i64, Vec<Product>> = HashMap::new();
        for entry in self.query.find_products(&order_ids).await? {
            products.entry(entry.order_id).or_default().push(entry.product);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = products.remove(&order.id).unwrap_or_default();
                OrderResponse::new(order, items)
            })
            .collect())
    }
}

#[async_trait]
impl OrderServiceTrait for OrderService {
    async fn checkout(&self, user_id: i64) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        info!("💳 Checking out cart of user {user_id}");

        let tracing_ctx = self.tracer.start_tracing(
            "checkout",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("user_id", user_id),
            ],
        );

        match self.do_checkout(user_id).await {
            Ok(order) => {
                self.tracer.complete_tracing_success(
                    &tracing_ctx,
                    Method::Post,
                    &format!("Order {} created", order.id),
                );
                Ok(ApiResponse::success("Order placed successfully", order))
            }
            Err(e) => {
                self.tracer.complete_tracing_error(
                    &tracing_ctx,
                    Method::Post,
                    &format!("Checkout failed for user {user_id}: {e}"),
                );
                Err(e)
            }
        }
    }

    async fn find_by_user(
        &self,
        user_id: i64,
    ) -> Result<ApiResponse<Vec<OrderResponse>>, ServiceError> {
        let tracing_ctx = self.tracer.start_tracing(
            "orders_of_user",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("user_id", user_id),
            ],
        );

        match self.do_find_by_user(user_id).await {
            Ok(orders) => {
                self.tracer
                    .complete_tracing_success(&tracing_ctx, Method::Get, "Orders retrieved");
                Ok(ApiResponse::success("Orders retrieved successfully", orders))
            }
            Err(e) => {
                self.tracer.complete_tracing_error(
                    &tracing_ctx,
                    Method::Get,
                    &format!("Failed to fetch orders of user {user_id}: {e}"),
                );
                Err(e)
            }
        }
    }

    async fn orders_count_by_user(
        &self,
    ) -> Result<ApiResponse<Vec<OrderCountByUser>>, ServiceError> {
        let summaries = self.query.find_summaries().await?;

        Ok(ApiResponse::success(
            "Order counts retrieved successfully",
            count_orders_by_user(&summaries),
        ))
    }

    async fn total_price_by_user(
        &self,
    ) -> Result<ApiResponse<Vec<TotalPriceByUser>>, ServiceError> {
        let summaries = self.query.find_summaries().await?;

        Ok(ApiResponse::success(
            "Order totals retrieved successfully",
            sum_totals_by_user(&summaries),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstract_trait::{CartCommandRepositoryTrait, CartQueryRepositoryTrait},
        di::DependenciesInject,
        errors::RepositoryError,
        model::Cart,
        testing::{InMemoryStore, TestBackend},
    };
    use async_trait::async_trait;
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    /// Cart reads that let another request add a product right after the
    /// first line listing.
    struct AddAfterRead {
        store: Arc<InMemoryStore>,
        product_id: i64,
        added: AtomicBool,
    }

    #[async_trait]
    impl CartQueryRepositoryTrait for AddAfterRead {
        async fn find_by_user(&self, user_id: i64) -> Result<Option<Cart>, RepositoryError> {
            CartQueryRepositoryTrait::find_by_user(self.store.as_ref(), user_id).await
        }

        async fn find_lines(&self, cart_id: i64) -> Result<Vec<CartLine>, RepositoryError> {
            let lines = self.store.find_lines(cart_id).await?;
            if !self.added.swap(true, Ordering::SeqCst) {
                self.store.insert_item(cart_id, self.product_id, 1).await?;
            }
            Ok(lines)
        }
    }

    fn summary(order_id: i64, username: &str, total_price: f64) -> OrderSummary {
        OrderSummary {
            order_id,
            username: username.into(),
            total_price,
        }
    }

    #[test]
    fn metrics_group_per_username() {
        let summaries = vec![
            summary(1, "bob", 10.0),
            summary(2, "alice", 5.0),
            summary(3, "bob", 2.5),
        ];

        assert_eq!(
            count_orders_by_user(&summaries),
            vec![
                OrderCountByUser {
                    username: "alice".into(),
                    order_count: 1
                },
                OrderCountByUser {
                    username: "bob".into(),
                    order_count: 2
                },
            ]
        );

        let totals = sum_totals_by_user(&summaries);
        assert_eq!(totals[1].username, "bob");
        assert_eq!(totals[1].total_price, 12.5);
    }

    #[tokio::test]
    async fn checkout_of_empty_cart_fails() {
        let backend = TestBackend::new();
        let user = backend.seed_user("alice", "alice@example.com", "secret1", "USER").await;
        let deps = backend.dependencies();

        let result = deps.order_service.checkout(user.id).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn checkout_totals_cart_and_empties_it() {
        let backend = TestBackend::new();
        let user = backend.seed_user("alice", "alice@example.com", "secret1", "USER").await;
        let guitar = backend.seed_product("Strat", 1000.0, None, None).await;
        let picks = backend.seed_product("Picks", 2.5, None, None).await;
        let deps = backend.dependencies();

        deps.cart_service.add_product(user.id, guitar.id).await.unwrap();
        deps.cart_service.add_product(user.id, picks.id).await.unwrap();
        deps.cart_service.add_product(user.id, picks.id).await.unwrap();

        let order = deps.order_service.checkout(user.id).await.unwrap().data;

        assert_eq!(order.total_price, 1005.0);
        assert_eq!(order.products.len(), 3);

        let cart = deps.cart_service.get_cart(user.id).await.unwrap().data;
        assert!(cart.items.is_empty());

        let history = deps.order_service.find_by_user(user.id).await.unwrap().data;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].products.len(), 3);
    }

    #[tokio::test]
    async fn checkout_keeps_items_added_after_the_cart_was_read() {
        let backend = TestBackend::new();
        let user = backend.seed_user("alice", "alice@example.com", "secret1", "USER").await;
        let guitar = backend.seed_product("Strat", 1000.0, None, None).await;
        let picks = backend.seed_product("Picks", 2.5, None, None).await;
        let cart = backend.store.get_or_create(user.id).await.unwrap();
        backend.store.insert_item(cart.id, guitar.id, 1).await.unwrap();

        let mut deps = backend.deps();
        deps.cart_query = Arc::new(AddAfterRead {
            store: backend.store.clone(),
            product_id: picks.id,
            added: AtomicBool::new(false),
        });
        let services = DependenciesInject::new(deps, &mut Registry::default());

        let order = services.order_service.checkout(user.id).await.unwrap().data;
        assert_eq!(order.products.len(), 1);
        assert_eq!(order.total_price, 1000.0);

        let remaining = backend.store.find_lines(cart.id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].product.id, picks.id);
    }

    #[tokio::test]
    async fn deleting_product_detaches_it_from_carts_and_orders() {
        let backend = TestBackend::new();
        let user = backend.seed_user("alice", "alice@example.com", "secret1", "USER").await;
        let guitar = backend.seed_product("Strat", 1000.0, None, None).await;
        let picks = backend.seed_product("Picks", 2.5, None, None).await;
        let deps = backend.dependencies();

        deps.cart_service.add_product(user.id, guitar.id).await.unwrap();
        deps.cart_service.add_product(user.id, picks.id).await.unwrap();
        deps.order_service.checkout(user.id).await.unwrap();
        deps.cart_service.add_product(user.id, guitar.id).await.unwrap();

        deps.product_service.delete_product(guitar.id).await.unwrap();

        let cart = deps.cart_service.get_cart(user.id).await.unwrap().data;
        assert!(cart.items.is_empty());

        let history = deps.order_service.find_by_user(user.id).await.unwrap().data;
        assert_eq!(history[0].products.len(), 1);
        assert_eq!(history[0].products[0].id, picks.id);
        assert_eq!(history[0].total_price, 1002.5);
    }

    #[tokio::test]
    async fn metrics_reflect_checkouts() {
        let backend = TestBackend::new();
        let alice = backend.seed_user("alice", "alice@example.com", "secret1", "USER").await;
        let bob = backend.seed_user("bob", "bob@example.com", "secret1", "USER").await;
        let product = backend.seed_product("Strat", 100.0, None, None).await;
        let deps = backend.dependencies();

        for user in [&alice, &bob, &alice] {
            deps.cart_service.add_product(user.id, product.id).await.unwrap();
            deps.order_service.checkout(user.id).await.unwrap();
        }

        let counts = deps.order_service.orders_count_by_user().await.unwrap().data;
        assert_eq!(counts[0].username, "alice");
        assert_eq!(counts[0].order_count, 2);

        let totals = deps.order_service.total_price_by_user().await.unwrap().data;
        assert_eq!(totals[0].total_price, 200.0);
        assert_eq!(totals[1].total_price, 100.0);
    }
}
