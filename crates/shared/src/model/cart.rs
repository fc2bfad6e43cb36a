use crate::model::Product;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cart {
    pub id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CartItem {
    pub id: i64,
    pub cart_id: i64,
    pub product_id: i64,
    pub quantity: i32,
}

/// A cart item joined with the product it points at.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CartLine {
    pub item_id: i64,
    pub quantity: i32,
    #[sqlx(flatten)]
    pub product: Product,
}
