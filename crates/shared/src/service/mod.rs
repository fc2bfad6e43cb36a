mod auth;
mod cart;
mod order;
mod product;
mod user;

pub use self::auth::{AuthService, AuthServiceDeps};
pub use self::cart::{CartChange, CartService, CartServiceDeps, cart_total, merge_item};
pub use self::order::{
    OrderService, OrderServiceDeps, count_orders_by_user, flatten_items, sum_totals_by_user,
};
pub use self::product::{ProductService, ProductServiceDeps, distinct_values};
pub use self::user::{UserService, UserServiceDeps};
