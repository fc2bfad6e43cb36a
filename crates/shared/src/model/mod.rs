mod cart;
mod order;
mod product;
mod user;

pub use self::cart::{Cart, CartItem, CartLine};
pub use self::order::{Order, OrderProduct, OrderSummary};
pub use self::product::Product;
pub use self::user::{ROLE_ADMIN, ROLE_USER, User};
