use crate::{
    middleware::{
        admin::admin_middleware, session::session_middleware, validate::SimpleValidatedJson,
    },
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::Path,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use shared::{
    abstract_trait::{DynOrderService, DynProductService, DynUserService},
    domain::{
        requests::{ChangeRoleRequest, CreateProductRequest, UpdateProductRequest},
        responses::{
            ApiResponse, OrderCountByUser, ProductResponse, TotalPriceByUser, UserResponse,
        },
    },
    errors::HttpError,
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "All users", body = ApiResponse<Vec<UserResponse>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn get_users(
    Extension(service): Extension<DynUserService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_all().await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{userId}/role",
    tag = "Admin",
    security(("session_cookie" = [])),
    params(("userId" = i64, Path, description = "User ID")),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Role changed, the user's session revoked", body = ApiResponse<UserResponse>),
        (status = 400, description = "Unknown role"),
        (status = 404, description = "User not found"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn change_user_role(
    Extension(service): Extension<DynUserService>,
    Path(user_id): Path<i64>,
    SimpleValidatedJson(body): SimpleValidatedJson<ChangeRoleRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.change_role(user_id, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{userId}",
    tag = "Admin",
    security(("session_cookie" = [])),
    params(("userId" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User, cart and orders deleted"),
        (status = 404, description = "User not found"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn delete_user(
    Extension(service): Extension<DynUserService>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.delete_user(user_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    tag = "Admin",
    security(("session_cookie" = [])),
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn create_product(
    Extension(service): Extension<DynProductService>,
    SimpleValidatedJson(body): SimpleValidatedJson<CreateProductRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.create_product(&body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{productId}",
    tag = "Admin",
    security(("session_cookie" = [])),
    params(("productId" = i64, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn update_product(
    Extension(service): Extension<DynProductService>,
    Path(product_id): Path<i64>,
    SimpleValidatedJson(mut body): SimpleValidatedJson<UpdateProductRequest>,
) -> Result<impl IntoResponse, HttpError> {
    body.id = product_id;

    let response = service.update_product(&body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{productId}",
    tag = "Admin",
    security(("session_cookie" = [])),
    params(("productId" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product removed from carts, orders and the catalog"),
        (status = 404, description = "Product not found"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn delete_product(
    Extension(service): Extension<DynProductService>,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.delete_product(product_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/metrics/orders-by-user",
    tag = "Admin",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Number of orders per username", body = ApiResponse<Vec<OrderCountByUser>>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn orders_by_user(
    Extension(service): Extension<DynOrderService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.orders_count_by_user().await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/metrics/total-price-by-user",
    tag = "Admin",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Sum of order totals per username", body = ApiResponse<Vec<TotalPriceByUser>>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn total_price_by_user(
    Extension(service): Extension<DynOrderService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.total_price_by_user().await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn admin_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/admin/users", get(get_users))
        .route("/api/admin/users/{userId}/role", put(change_user_role))
        .route("/api/admin/users/{userId}", delete(delete_user))
        .route("/api/admin/products", post(create_product))
        .route(
            "/api/admin/products/{productId}",
            put(update_product).delete(delete_product),
        )
        .route(
            "/api/admin/orders/metrics/orders-by-user",
            get(orders_by_user),
        )
        .route(
            "/api/admin/orders/metrics/total-price-by-user",
            get(total_price_by_user),
        )
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn(session_middleware))
        .layer(Extension(app_state.di_container.user_service.clone()))
        .layer(Extension(app_state.di_container.product_service.clone()))
        .layer(Extension(app_state.di_container.order_service.clone()))
        .layer(Extension(app_state.di_container.auth_service.clone()))
}
