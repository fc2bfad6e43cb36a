mod admin;
mod auth;
mod cart;
mod product;
mod user;

use crate::state::AppState;
use anyhow::Result;
use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus_client::encoding::text::encode;
use shared::utils::shutdown_signal;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

pub use self::admin::admin_routes;
pub use self::auth::auth_routes;
pub use self::cart::cart_routes;
pub use self::product::product_routes;
pub use self::user::user_routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login_handler,
        auth::logout_handler,

        user::register_handler,
        user::get_me_handler,
        user::change_password_handler,
        user::change_email_handler,

        product::get_products,
        product::get_product,
        product::get_categories,
        product::get_brands,

        cart::get_cart,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::clear_cart,
        cart::checkout,
        cart::get_orders,

        admin::get_users,
        admin::change_user_role,
        admin::delete_user,
        admin::create_product,
        admin::update_product,
        admin::delete_product,
        admin::orders_by_user,
        admin::total_price_by_user,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Form login and logout"),
        (name = "User", description = "Registration and profile endpoints"),
        (name = "Product", description = "Public catalog endpoints"),
        (name = "Cart", description = "Shopping cart endpoints"),
        (name = "Order", description = "Checkout and order history endpoints"),
        (name = "Admin", description = "User, product and order administration"),
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("SESSION"))),
            );
        }
    }
}

pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let mut buffer = String::new();

    let registry = state.registry.lock().await;

    if let Err(e) = encode(&mut buffer, &registry) {
        error!("❌ Failed to encode metrics: {e}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {e}"),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [(
            CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        buffer,
    )
        .into_response()
}

pub struct AppRouter;

impl AppRouter {
    pub fn router(app_state: AppState) -> Router {
        let shared_state = Arc::new(app_state);

        let api_router = OpenApiRouter::with_openapi(ApiDoc::openapi())
            .route("/metrics", get(metrics_handler))
            .with_state(shared_state.clone())
            .merge(auth_routes(shared_state.clone()))
            .merge(user_routes(shared_state.clone()))
            .merge(product_routes(shared_state.clone()))
            .merge(cart_routes(shared_state.clone()))
            .merge(admin_routes(shared_state.clone()));

        let router_with_layers = api_router
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024))
            .layer(TraceLayer::new_for_http());

        let (app_router, api) = router_with_layers.split_for_parts();

        app_router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
    }

    pub async fn serve(port: u16, app_state: AppState) -> Result<()> {
        let app = Self::router(app_state);

        let addr = format!("0.0.0.0:{port}");
        let listener = TcpListener::bind(&addr).await?;

        info!("🚀 Server running on http://{}", listener.local_addr()?);
        info!("📖 Swagger UI: http://localhost:{port}/swagger-ui");
        info!("📊 Metrics: http://localhost:{port}/metrics");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}
