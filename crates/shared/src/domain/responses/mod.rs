mod api;
mod cart;
mod metrics;
mod order;
mod product;
mod session;
mod user;

pub use self::api::ApiResponse;
pub use self::cart::{CartItemResponse, CartResponse};
pub use self::metrics::{OrderCountByUser, TotalPriceByUser};
pub use self::order::OrderResponse;
pub use self::product::ProductResponse;
pub use self::session::SessionResponse;
pub use self::user::UserResponse;
