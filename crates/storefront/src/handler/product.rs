use crate::state::AppState;
use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use shared::{
    abstract_trait::DynProductService,
    domain::responses::{ApiResponse, ProductResponse},
    errors::HttpError,
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/public/products",
    tag = "Product",
    responses(
        (status = 200, description = "List of products", body = ApiResponse<Vec<ProductResponse>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_products(
    Extension(service): Extension<DynProductService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_all().await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/public/products/{id}",
    tag = "Product",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product details", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    Extension(service): Extension<DynProductService>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_by_id(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/public/products/categories",
    tag = "Product",
    responses(
        (status = 200, description = "Distinct product categories", body = ApiResponse<Vec<String>>)
    )
)]
pub async fn get_categories(
    Extension(service): Extension<DynProductService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.categories().await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/public/products/brands",
    tag = "Product",
    responses(
        (status = 200, description = "Distinct product brands", body = ApiResponse<Vec<String>>)
    )
)]
pub async fn get_brands(
    Extension(service): Extension<DynProductService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.brands().await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn product_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/public/products", get(get_products))
        .route("/api/public/products/categories", get(get_categories))
        .route("/api/public/products/brands", get(get_brands))
        .route("/api/public/products/{id}", get(get_product))
        .layer(Extension(app_state.di_container.product_service.clone()))
}
