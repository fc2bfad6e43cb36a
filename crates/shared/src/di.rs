use crate::{
    abstract_trait::{
        DynAuthService, DynCacheStore, DynCaptchaVerifier, DynCartCommandRepository,
        DynCartQueryRepository, DynCartService, DynHashing, DynOrderCommandRepository,
        DynOrderQueryRepository, DynOrderService, DynProductCommandRepository,
        DynProductQueryRepository, DynProductService, DynSessionStore, DynUserCommandRepository,
        DynUserQueryRepository, DynUserService,
    },
    cache::{CacheStore, SessionStore},
    config::{ConnectionPool, RedisClient},
    repository::{CartRepository, OrderRepository, ProductRepository, UserRepository},
    service::{
        AuthService, AuthServiceDeps, CartService, CartServiceDeps, OrderService,
        OrderServiceDeps, ProductService, ProductServiceDeps, UserService, UserServiceDeps,
    },
};
use chrono::Duration;
use prometheus_client::registry::Registry;
use std::{fmt, sync::Arc};

#[derive(Clone)]
pub struct DependenciesInject {
    pub auth_service: DynAuthService,
    pub user_service: DynUserService,
    pub product_service: DynProductService,
    pub cart_service: DynCartService,
    pub order_service: DynOrderService,
}

impl fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("auth_service", &"<AuthService>")
            .field("user_service", &"<UserService>")
            .field("product_service", &"<ProductService>")
            .field("cart_service", &"<CartService>")
            .field("order_service", &"<OrderService>")
            .finish()
    }
}

/// Every seam the services are built from. Production wiring comes from
/// [`DependenciesInjectDeps::postgres`]; tests plug in the in-memory fakes.
#[derive(Clone)]
pub struct DependenciesInjectDeps {
    pub user_query: DynUserQueryRepository,
    pub user_command: DynUserCommandRepository,
    pub product_query: DynProductQueryRepository,
    pub product_command: DynProductCommandRepository,
    pub cart_query: DynCartQueryRepository,
    pub cart_command: DynCartCommandRepository,
    pub order_query: DynOrderQueryRepository,
    pub order_command: DynOrderCommandRepository,
    pub hash: DynHashing,
    pub captcha: DynCaptchaVerifier,
    pub cache: DynCacheStore,
    pub sessions: DynSessionStore,
    pub session_ttl: Duration,
}

impl DependenciesInjectDeps {
    pub fn postgres(
        pool: ConnectionPool,
        redis: &RedisClient,
        hash: DynHashing,
        captcha: DynCaptchaVerifier,
        session_ttl: Duration,
    ) -> Self {
        let user = UserRepository::new(pool.clone());
        let product = ProductRepository::new(pool.clone());
        let cart = CartRepository::new(pool.clone());
        let order = OrderRepository::new(pool);

        Self {
            user_query: user.query,
            user_command: user.command,
            product_query: product.query,
            product_command: product.command,
            cart_query: cart.query,
            cart_command: cart.command,
            order_query: order.query,
            order_command: order.command,
            hash,
            captcha,
            cache: Arc::new(CacheStore::new(redis.pool.clone())) as DynCacheStore,
            sessions: Arc::new(SessionStore::new(redis.pool.clone())) as DynSessionStore,
            session_ttl,
        }
    }
}

impl DependenciesInject {
    pub fn new(deps: DependenciesInjectDeps, registry: &mut Registry) -> Self {
        let auth_service = Arc::new(AuthService::new(
            AuthServiceDeps {
                query: deps.user_query.clone(),
                hash: deps.hash.clone(),
                captcha: deps.captcha.clone(),
                sessions: deps.sessions.clone(),
                session_ttl: deps.session_ttl,
            },
            registry,
        )) as DynAuthService;

        let user_service = Arc::new(UserService::new(
            UserServiceDeps {
                query: deps.user_query.clone(),
                command: deps.user_command.clone(),
                hash: deps.hash.clone(),
                captcha: deps.captcha.clone(),
                auth: auth_service.clone(),
            },
            registry,
        )) as DynUserService;

        let product_service = Arc::new(ProductService::new(
            ProductServiceDeps {
                query: deps.product_query.clone(),
                command: deps.product_command.clone(),
                cache: deps.cache.clone(),
            },
            registry,
        )) as DynProductService;

        let cart_service = Arc::new(CartService::new(
            CartServiceDeps {
                query: deps.cart_query.clone(),
                command: deps.cart_command.clone(),
                products: deps.product_query.clone(),
            },
            registry,
        )) as DynCartService;

        let order_service = Arc::new(OrderService::new(
            OrderServiceDeps {
                query: deps.order_query.clone(),
                command: deps.order_command.clone(),
                users: deps.user_query.clone(),
                cart_query: deps.cart_query.clone(),
                cart_command: deps.cart_command.clone(),
            },
            registry,
        )) as DynOrderService;

        Self {
            auth_service,
            user_service,
            product_service,
            cart_service,
            order_service,
        }
    }
}
