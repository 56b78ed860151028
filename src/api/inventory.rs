//! Inventory API endpoints
//!
//! Stock mutations:
//! - POST /api/inventory/{id}/purchase - Buy one unit (authenticated)
//! - POST /api/inventory/{id}/restock?amount= - Add stock (admin)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::api::sweets::DetailResponse;

/// Query parameters for restock
#[derive(Debug, Deserialize)]
pub struct RestockQuery {
    pub amount: i64,
}

/// POST /api/inventory/{id}/purchase - Purchase one unit
pub async fn purchase_sweet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DetailResponse>, ApiError> {
    state.inventory_service.purchase(id).await?;

    Ok(Json(DetailResponse {
        detail: "Purchase successful".to_string(),
    }))
}

/// POST /api/inventory/{id}/restock?amount= - Restock by `amount` units
pub async fn restock_sweet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<RestockQuery>,
) -> Result<Json<DetailResponse>, ApiError> {
    state.inventory_service.restock(id, query.amount).await?;

    Ok(Json(DetailResponse {
        detail: format!("Restocked {} units successfully", query.amount),
    }))
}
