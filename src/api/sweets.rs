//! Sweets API endpoints
//!
//! Catalog CRUD and search:
//! - GET    /api/sweets - List all sweets (authenticated)
//! - GET    /api/sweets/search - Filtered search (authenticated)
//! - POST   /api/sweets - Create a sweet (admin)
//! - PUT    /api/sweets/{id} - Partial update (admin)
//! - DELETE /api/sweets/{id} - Delete (admin)
//! - POST   /api/sweets/bulk - Bulk create (admin)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::{Sweet, SweetFilter, SweetInput, SweetUpdate};

/// Response carrying a human-readable confirmation
#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

/// GET /api/sweets - List all sweets
pub async fn list_sweets(State(state): State<AppState>) -> Result<Json<Vec<Sweet>>, ApiError> {
    let sweets = state.catalog_service.list().await?;
    Ok(Json(sweets))
}

/// GET /api/sweets/search - Search with optional filters
///
/// Query parameters: name, category (case-insensitive substring matches),
/// min_price, max_price (inclusive bounds). Absent filters match
/// everything.
pub async fn search_sweets(
    State(state): State<AppState>,
    Query(filter): Query<SweetFilter>,
) -> Result<Json<Vec<Sweet>>, ApiError> {
    let sweets = state.catalog_service.search(&filter).await?;
    Ok(Json(sweets))
}

/// POST /api/sweets - Create a sweet
pub async fn create_sweet(
    State(state): State<AppState>,
    Json(input): Json<SweetInput>,
) -> Result<Json<Sweet>, ApiError> {
    let sweet = state.catalog_service.create(input).await?;
    Ok(Json(sweet))
}

/// PUT /api/sweets/{id} - Partial update
pub async fn update_sweet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<SweetUpdate>,
) -> Result<Json<Sweet>, ApiError> {
    let sweet = state.catalog_service.update(id, update).await?;
    Ok(Json(sweet))
}

/// DELETE /api/sweets/{id} - Delete a sweet
pub async fn delete_sweet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DetailResponse>, ApiError> {
    state.catalog_service.delete(id).await?;
    Ok(Json(DetailResponse {
        detail: "Sweet deleted successfully".to_string(),
    }))
}

/// POST /api/sweets/bulk - Create several sweets in one request
pub async fn create_sweets_bulk(
    State(state): State<AppState>,
    Json(inputs): Json<Vec<SweetInput>>,
) -> Result<Json<Vec<Sweet>>, ApiError> {
    let sweets = state.catalog_service.create_many(inputs).await?;
    Ok(Json(sweets))
}
