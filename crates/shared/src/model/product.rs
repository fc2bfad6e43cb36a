use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: f64,
    pub in_stock: bool,
    pub description: Option<String>,
}
