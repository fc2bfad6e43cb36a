use crate::model::Product;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: f64,
    pub in_stock: bool,
    pub description: Option<String>,
}

impl From<Product> for ProductResponse {
    fn from(value: Product) -> Self {
        ProductResponse {
            id: value.id,
            name: value.name,
            image: value.image,
            category: value.category,
            brand: value.brand,
            price: value.price,
            in_stock: value.in_stock,
            description: value.description,
        }
    }
}
