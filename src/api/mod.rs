//! API layer - HTTP handlers and routing
//!
//! All HTTP endpoints for the sweetshop backend:
//! - Auth endpoints (register, login, me)
//! - Sweets catalog endpoints (CRUD, search, bulk create)
//! - Inventory endpoints (purchase, restock)
//!
//! Endpoints are grouped by authorization tier: public routes need no
//! identity, protected routes need a valid bearer token, and admin routes
//! additionally need the admin flag.

pub mod auth;
pub mod inventory;
pub mod middleware;
pub mod sweets;

#[cfg(test)]
mod tests;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (tier 2)
    let admin_routes = Router::new()
        .route("/sweets", post(sweets::create_sweet))
        .route("/sweets/bulk", post(sweets::create_sweets_bulk))
        .route("/sweets/{id}", put(sweets::update_sweet))
        .route("/sweets/{id}", delete(sweets::delete_sweet))
        .route("/inventory/{id}/restock", post(inventory::restock_sweet))
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (tier 1: any authenticated user)
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::get_current_user))
        .route("/sweets", get(sweets::list_sweets))
        .route("/sweets/search", get(sweets::search_sweets))
        .route("/inventory/{id}/purchase", post(inventory::purchase_sweet))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .merge(admin_routes)
        .merge(protected_routes)
}

/// GET / - Liveness probe
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Sweet Shop API is running" }))
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    Router::new()
        .route("/", get(root))
        .nest("/api", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
