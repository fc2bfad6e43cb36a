use crate::model::Product;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub order_date: NaiveDateTime,
    pub total_price: f64,
}

/// One unit of a product inside an order, in purchase order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderProduct {
    pub order_id: i64,
    pub position: i32,
    #[sqlx(flatten)]
    pub product: Product,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderSummary {
    pub order_id: i64,
    pub username: String,
    pub total_price: f64,
}
