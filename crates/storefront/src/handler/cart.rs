use crate::{middleware::session::session_middleware, state::AppState};
use axum::{
    Extension, Json,
    extract::Path,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use shared::{
    abstract_trait::{DynCartService, DynOrderService},
    cache::Session,
    domain::responses::{ApiResponse, CartResponse, OrderResponse},
    errors::HttpError,
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/cart",
    tag = "Cart",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Current cart, created on first access", body = ApiResponse<CartResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_cart(
    Extension(service): Extension<DynCartService>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.get_cart(session.user_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/cart/add/{productId}",
    tag = "Cart",
    security(("session_cookie" = [])),
    params(("productId" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product added or its quantity increased", body = ApiResponse<CartResponse>),
        (status = 404, description = "Product not found"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn add_to_cart(
    Extension(service): Extension<DynCartService>,
    Extension(session): Extension<Session>,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.add_product(session.user_id, product_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/cart/remove/{cartItemId}",
    tag = "Cart",
    security(("session_cookie" = [])),
    params(("cartItemId" = i64, Path, description = "Cart item ID")),
    responses(
        (status = 200, description = "Item removed", body = ApiResponse<CartResponse>),
        (status = 404, description = "Item not in the cart"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn remove_from_cart(
    Extension(service): Extension<DynCartService>,
    Extension(session): Extension<Session>,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.remove_item(session.user_id, item_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/cart/clear",
    tag = "Cart",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Cart emptied", body = ApiResponse<CartResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn clear_cart(
    Extension(service): Extension<DynCartService>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.clear_cart(session.user_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/cart/checkout",
    tag = "Order",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Order placed and cart emptied", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Cart is empty"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn checkout(
    Extension(service): Extension<DynOrderService>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.checkout(session.user_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/cart/orders",
    tag = "Order",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Orders of the current user", body = ApiResponse<Vec<OrderResponse>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_orders(
    Extension(service): Extension<DynOrderService>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_by_user(session.user_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn cart_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/cart", get(get_cart))
        .route("/api/cart/add/{productId}", post(add_to_cart))
        .route("/api/cart/remove/{cartItemId}", delete(remove_from_cart))
        .route("/api/cart/clear", delete(clear_cart))
        .route("/api/cart/checkout", post(checkout))
        .route("/api/cart/orders", get(get_orders))
        .route_layer(middleware::from_fn(session_middleware))
        .layer(Extension(app_state.di_container.cart_service.clone()))
        .layer(Extension(app_state.di_container.order_service.clone()))
        .layer(Extension(app_state.di_container.auth_service.clone()))
}
