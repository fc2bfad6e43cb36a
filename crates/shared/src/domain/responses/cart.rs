use crate::domain::responses::ProductResponse;
use crate::model::{Cart, CartLine};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct CartItemResponse {
    pub id: i64,
    pub product: ProductResponse,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub id: i64,
    pub user_id: i64,
    pub items: Vec<CartItemResponse>,
    pub total_price: f64,
}

impl From<CartLine> for CartItemResponse {
    fn from(value: CartLine) -> Self {
        CartItemResponse {
            id: value.item_id,
            product: ProductResponse::from(value.product),
            quantity: value.quantity,
        }
    }
}

impl CartResponse {
    pub fn new(cart: Cart, lines: Vec<CartLine>, total_price: f64) -> Self {
        CartResponse {
            id: cart.id,
            user_id: cart.user_id,
            items: lines.into_iter().map(CartItemResponse::from).collect(),
            total_price,
        }
    }
}
