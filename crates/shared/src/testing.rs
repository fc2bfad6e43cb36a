//! In-memory stand-ins for Postgres, Redis and reCAPTCHA, used by the unit
//! tests of this crate and by the HTTP tests of the storefront.

use crate::{
    abstract_trait::{
        CacheStoreTrait, CaptchaVerifierTrait, CartCommandRepositoryTrait,
        CartQueryRepositoryTrait, DynCacheStore, DynCaptchaVerifier, DynCartCommandRepository,
        DynCartQueryRepository, DynHashing, DynOrderCommandRepository, DynOrderQueryRepository,
        DynProductCommandRepository, DynProductQueryRepository, DynSessionStore,
        DynUserCommandRepository, DynUserQueryRepository, HashingTrait,
        OrderCommandRepositoryTrait, OrderQueryRepositoryTrait, ProductCommandRepositoryTrait,
        ProductQueryRepositoryTrait, SessionStoreTrait, UserCommandRepositoryTrait,
        UserQueryRepositoryTrait,
    },
    cache::Session,
    config::Hashing,
    di::{DependenciesInject, DependenciesInjectDeps},
    domain::requests::{CreateProductRequest, CreateUserRequest, UpdateProductRequest},
    errors::RepositoryError,
    model::{Cart, CartItem, CartLine, Order, OrderProduct, OrderSummary, Product, User},
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use prometheus_client::registry::Registry;
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    products: Vec<Product>,
    carts: Vec<Cart>,
    cart_items: Vec<CartItem>,
    orders: Vec<Order>,
    /// (order_id, product_id, position)
    order_products: Vec<(i64, i64, i32)>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn product(&self, id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

/// Tables kept in vectors, with the same uniqueness rules as the schema.
/// Each method mirrors the effect of the matching Postgres query in
/// `repository`, including its cascades.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

#[async_trait]
impl UserQueryRepositoryTrait for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(lock(&self.state).users.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.state).users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.state)
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.state)
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[async_trait]
impl UserCommandRepositoryTrait for InMemoryStore {
    async fn create_user(&self, req: &CreateUserRequest) -> Result<User, RepositoryError> {
        let mut state = lock(&self.state);

        if state
            .users
            .iter()
            .any(|u| u.username == req.username || u.email == req.email)
        {
            return Err(RepositoryError::AlreadyExists("username or email".into()));
        }

        let user = User {
            id: state.next_id(),
            username: req.username.clone(),
            email: req.email.clone(),
            password: req.password.clone(),
            role: req.role.clone(),
        };
        state.users.push(user.clone());

        Ok(user)
    }

    async fn update_password(&self, id: i64, password: &str) -> Result<(), RepositoryError> {
        let mut state = lock(&self.state);
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepositoryError::NotFound)?;

        user.password = password.to_string();
        Ok(())
    }

    async fn update_email(&self, id: i64, email: &str) -> Result<User, RepositoryError> {
        let mut state = lock(&self.state);

        if state.users.iter().any(|u| u.email == email && u.id != id) {
            return Err(RepositoryError::AlreadyExists("email".into()));
        }

        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepositoryError::NotFound)?;

        user.email = email.to_string();
        Ok(user.clone())
    }

    async fn update_role(&self, id: i64, role: &str) -> Result<User, RepositoryError> {
        let mut state = lock(&self.state);
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepositoryError::NotFound)?;

        user.role = role.to_string();
        Ok(user.clone())
    }

    async fn delete_user(&self, id: i64) -> Result<(), RepositoryError> {
        let mut state = lock(&self.state);

        if !state.users.iter().any(|u| u.id == id) {
            return Err(RepositoryError::NotFound);
        }

        let cart_ids: Vec<i64> = state
            .carts
            .iter()
            .filter(|c| c.user_id == id)
            .map(|c| c.id)
            .collect();
        let order_ids: Vec<i64> = state
            .orders
            .iter()
            .filter(|o| o.user_id == id)
            .map(|o| o.id)
            .collect();

        state.cart_items.retain(|i| !cart_ids.contains(&i.cart_id));
        state.carts.retain(|c| c.user_id != id);
        state
            .order_products
            .retain(|(order_id, _, _)| !order_ids.contains(order_id));
        state.orders.retain(|o| o.user_id != id);
        state.users.retain(|u| u.id != id);

        Ok(())
    }
}

#[async_trait]
impl ProductQueryRepositoryTrait for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(lock(&self.state).products.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, RepositoryError> {
        Ok(lock(&self.state).product(id).cloned())
    }
}

#[async_trait]
impl ProductCommandRepositoryTrait for InMemoryStore {
    async fn create_product(&self, req: &CreateProductRequest) -> Result<Product, RepositoryError> {
        let mut state = lock(&self.state);

        let product = Product {
            id: state.next_id(),
            name: req.name.clone(),
            image: req.image.clone(),
            category: req.category.clone(),
            brand: req.brand.clone(),
            price: req.price,
            in_stock: req.in_stock,
            description: req.description.clone(),
        };
        state.products.push(product.clone());

        Ok(product)
    }

    async fn update_product(&self, req: &UpdateProductRequest) -> Result<Product, RepositoryError> {
        let mut state = lock(&self.state);
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == req.id)
            .ok_or(RepositoryError::NotFound)?;

        product.name = req.name.clone();
        product.image = req.image.clone();
        product.category = req.category.clone();
        product.brand = req.brand.clone();
        product.price = req.price;
        product.in_stock = req.in_stock;
        product.description = req.description.clone();

        Ok(product.clone())
    }

    async fn delete_product(&self, id: i64) -> Result<(), RepositoryError> {
        let mut state = lock(&self.state);

        if state.product(id).is_none() {
            return Err(RepositoryError::NotFound);
        }

        state.cart_items.retain(|i| i.product_id != id);
        state
            .order_products
            .retain(|(_, product_id, _)| *product_id != id);
        state.products.retain(|p| p.id != id);

        Ok(())
    }
}

#[async_trait]
impl CartQueryRepositoryTrait for InMemoryStore {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Cart>, RepositoryError> {
        Ok(lock(&self.state)
            .carts
            .iter()
            .find(|c| c.user_id == user_id)
            .cloned())
    }

    async fn find_lines(&self, cart_id: i64) -> Result<Vec<CartLine>, RepositoryError> {
        let state = lock(&self.state);

        Ok(state
            .cart_items
            .iter()
            .filter(|i| i.cart_id == cart_id)
            .filter_map(|i| {
                state.product(i.product_id).map(|product| CartLine {
                    item_id: i.id,
                    quantity: i.quantity,
                    product: product.clone(),
                })
            })
            .collect())
    }
}

#[async_trait]
impl CartCommandRepositoryTrait for InMemoryStore {
    async fn get_or_create(&self, user_id: i64) -> Result<Cart, RepositoryError> {
        let mut state = lock(&self.state);

        if let Some(cart) = state.carts.iter().find(|c| c.user_id == user_id) {
            return Ok(cart.clone());
        }

        let cart = Cart {
            id: state.next_id(),
            user_id,
        };
        state.carts.push(cart.clone());

        Ok(cart)
    }

    async fn insert_item(
        &self,
        cart_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let mut state = lock(&self.state);

        if state
            .cart_items
            .iter()
            .any(|i| i.cart_id == cart_id && i.product_id == product_id)
        {
            return Err(RepositoryError::AlreadyExists("cart item".into()));
        }

        let item = CartItem {
            id: state.next_id(),
            cart_id,
            product_id,
            quantity,
        };
        state.cart_items.push(item.clone());

        Ok(item)
    }

    async fn increment_quantity(&self, item_id: i64) -> Result<CartItem, RepositoryError> {
        let mut state = lock(&self.state);
        let item = state
            .cart_items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or(RepositoryError::NotFound)?;

        item.quantity += 1;
        Ok(item.clone())
    }

    async fn delete_item(&self, cart_id: i64, item_id: i64) -> Result<bool, RepositoryError> {
        let mut state = lock(&self.state);
        let before = state.cart_items.len();

        state
            .cart_items
            .retain(|i| !(i.id == item_id && i.cart_id == cart_id));

        Ok(state.cart_items.len() < before)
    }

    async fn clear(&self, cart_id: i64) -> Result<(), RepositoryError> {
        lock(&self.state).cart_items.retain(|i| i.cart_id != cart_id);
        Ok(())
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for InMemoryStore {
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Order>, RepositoryError> {
        Ok(lock(&self.state)
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_products(&self, order_ids: &[i64]) -> Result<Vec<OrderProduct>, RepositoryError> {
        let state = lock(&self.state);

        let mut entries: Vec<OrderProduct> = state
            .order_products
            .iter()
            .filter(|(order_id, _, _)| order_ids.contains(order_id))
            .filter_map(|(order_id, product_id, position)| {
                state.product(*product_id).map(|product| OrderProduct {
                    order_id: *order_id,
                    position: *position,
                    product: product.clone(),
                })
            })
            .collect();

        entries.sort_by_key(|e| (e.order_id, e.position));
        Ok(entries)
    }

    async fn find_summaries(&self) -> Result<Vec<OrderSummary>, RepositoryError> {
        let state = lock(&self.state);

        Ok(state
            .orders
            .iter()
            .filter_map(|o| {
                state
                    .users
                    .iter()
                    .find(|u| u.id == o.user_id)
                    .map(|u| OrderSummary {
                        order_id: o.id,
                        username: u.username.clone(),
                        total_price: o.total_price,
                    })
            })
            .collect())
    }
}

#[async_trait]
impl OrderCommandRepositoryTrait for InMemoryStore {
    async fn create_from_cart(
        &self,
        user_id: i64,
        cart_id: i64,
        item_ids: &[i64],
        product_ids: &[i64],
        total_price: f64,
    ) -> Result<Order, RepositoryError> {
        let mut state = lock(&self.state);

        let order = Order {
            id: state.next_id(),
            user_id,
            order_date: Utc::now().naive_utc(),
            total_price,
        };

        for (position, product_id) in product_ids.iter().enumerate() {
            state
                .order_products
                .push((order.id, *product_id, position as i32));
        }
        state.orders.push(order.clone());
        state
            .cart_items
            .retain(|i| !(i.cart_id == cart_id && item_ids.contains(&i.id)));

        Ok(order)
    }
}

/// Key-value cache without expiry.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn contains(&self, key: &str) -> bool {
        lock(&self.entries).contains_key(key)
    }
}

#[async_trait]
impl CacheStoreTrait for MemoryCache {
    async fn get_raw(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    async fn set_raw(&self, key: &str, value: String, _expiration: Duration) {
        lock(&self.entries).insert(key.to_string(), value);
    }

    async fn delete_from_cache(&self, key: &str) {
        lock(&self.entries).remove(key);
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    user_sessions: Mutex<HashMap<i64, String>>,
}

impl MemorySessionStore {
    pub fn session_count(&self) -> usize {
        lock(&self.sessions).len()
    }
}

#[async_trait]
impl SessionStoreTrait for MemorySessionStore {
    async fn create_session(&self, session_id: &str, session: &Session, _ttl: Duration) -> bool {
        lock(&self.sessions).insert(session_id.to_string(), session.clone());
        true
    }

    async fn get_session(&self, session_id: &str) -> Option<Session> {
        lock(&self.sessions).get(session_id).cloned()
    }

    async fn refresh_session(&self, session_id: &str, _ttl: Duration) -> bool {
        lock(&self.sessions).contains_key(session_id)
    }

    async fn delete_session(&self, session_id: &str) -> bool {
        lock(&self.sessions).remove(session_id).is_some()
    }

    async fn get_user_session(&self, user_id: i64) -> Option<String> {
        lock(&self.user_sessions).get(&user_id).cloned()
    }

    async fn set_user_session(&self, user_id: i64, session_id: &str, _ttl: Duration) -> bool {
        lock(&self.user_sessions).insert(user_id, session_id.to_string());
        true
    }

    async fn delete_user_session(&self, user_id: i64) -> bool {
        lock(&self.user_sessions).remove(&user_id).is_some()
    }
}

/// Answers every verification with a switchable verdict.
pub struct StaticCaptcha {
    accept: AtomicBool,
}

impl StaticCaptcha {
    pub fn new(accept: bool) -> Self {
        Self {
            accept: AtomicBool::new(accept),
        }
    }

    pub fn set_accept(&self, accept: bool) {
        self.accept.store(accept, Ordering::SeqCst);
    }
}

#[async_trait]
impl CaptchaVerifierTrait for StaticCaptcha {
    async fn verify(&self, _response: &str) -> bool {
        self.accept.load(Ordering::SeqCst)
    }
}

pub struct TestBackend {
    pub store: Arc<InMemoryStore>,
    pub cache: Arc<MemoryCache>,
    pub sessions: Arc<MemorySessionStore>,
    pub captcha: Arc<StaticCaptcha>,
    hashing: Hashing,
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBackend {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::default()),
            cache: Arc::new(MemoryCache::default()),
            sessions: Arc::new(MemorySessionStore::default()),
            captcha: Arc::new(StaticCaptcha::new(true)),
            hashing: Hashing::with_cost(4),
        }
    }

    pub fn hashing(&self) -> Hashing {
        self.hashing.clone()
    }

    pub fn deps(&self) -> DependenciesInjectDeps {
        DependenciesInjectDeps {
            user_query: self.store.clone() as DynUserQueryRepository,
            user_command: self.store.clone() as DynUserCommandRepository,
            product_query: self.store.clone() as DynProductQueryRepository,
            product_command: self.store.clone() as DynProductCommandRepository,
            cart_query: self.store.clone() as DynCartQueryRepository,
            cart_command: self.store.clone() as DynCartCommandRepository,
            order_query: self.store.clone() as DynOrderQueryRepository,
            order_command: self.store.clone() as DynOrderCommandRepository,
            hash: Arc::new(self.hashing.clone()) as DynHashing,
            captcha: self.captcha.clone() as DynCaptchaVerifier,
            cache: self.cache.clone() as DynCacheStore,
            sessions: self.sessions.clone() as DynSessionStore,
            session_ttl: Duration::minutes(30),
        }
    }

    pub fn dependencies(&self) -> DependenciesInject {
        let mut registry = Registry::default();
        DependenciesInject::new(self.deps(), &mut registry)
    }

    pub async fn seed_user(&self, username: &str, email: &str, password: &str, role: &str) -> User {
        let password = self
            .hashing
            .hash_password(password)
            .await
            .expect("hash seed password");

        UserCommandRepositoryTrait::create_user(
            self.store.as_ref(),
            &CreateUserRequest {
                username: username.to_string(),
                email: email.to_string(),
                password,
                role: role.to_string(),
            },
        )
        .await
        .expect("seed user")
    }

    pub async fn seed_product(
        &self,
        name: &str,
        price: f64,
        category: Option<&str>,
        brand: Option<&str>,
    ) -> Product {
        ProductCommandRepositoryTrait::create_product(
            self.store.as_ref(),
            &CreateProductRequest {
                name: name.to_string(),
                image: None,
                category: category.map(str::to_string),
                brand: brand.map(str::to_string),
                price,
                in_stock: true,
                description: None,
            },
        )
        .await
        .expect("seed product")
    }

    pub async fn user_by_name(&self, username: &str) -> Option<User> {
        UserQueryRepositoryTrait::find_by_username(self.store.as_ref(), username)
            .await
            .ok()
            .flatten()
    }
}
