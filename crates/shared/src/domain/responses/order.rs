use crate::domain::responses::ProductResponse;
use crate::model::{Order, Product};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i64,
    pub user_id: i64,
    pub order_date: String,
    pub total_price: f64,
    pub products: Vec<ProductResponse>,
}

impl OrderResponse {
    pub fn new(order: Order, products: Vec<Product>) -> Self {
        OrderResponse {
            id: order.id,
            user_id: order.user_id,
            order_date: order.order_date.format("%Y-%m-%dT%H:%M:%S").to_string(),
            total_price: order.total_price,
            products: products.into_iter().map(ProductResponse::from).collect(),
        }
    }
}
