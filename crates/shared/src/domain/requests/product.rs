use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

fn default_in_stock() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,

    pub image: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,

    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,

    #[serde(default = "default_in_stock")]
    pub in_stock: bool,

    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[serde(skip)]
    pub id: i64,

    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,

    pub image: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,

    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,

    #[serde(default = "default_in_stock")]
    pub in_stock: bool,

    pub description: Option<String>,
}
