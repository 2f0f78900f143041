//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Fallback handler for unknown routes
async fn fallback_handler(uri: axum::http::Uri) -> impl IntoResponse {
    log::debug!("No route for {}", uri.path());

    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "application/json")],
        Body::from(r#"{"error":"Not Found"}"#),
    )
        .into_response()
}

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Assets
        .route(
            "/api/assets",
            get(handlers::list_assets).post(handlers::create_asset),
        )
        .route("/api/assets/{id}", get(handlers::get_asset))
        // Pricing
        .route(
            "/api/assets/{id}/price",
            get(handlers::get_currency_price),
        )
        .route("/api/assets/{id}/cost", get(handlers::get_asset_cost))
        .route("/api/assets/{id}/quote", get(handlers::quote_purchase))
        .fallback(fallback_handler)
        // Add state and middleware
        .with_state(state)
        .layer(cors)
}
