mod cart;
mod order;
mod product;
mod user;

pub use self::cart::CartRepository;
pub use self::order::OrderRepository;
pub use self::product::ProductRepository;
pub use self::user::UserRepository;
