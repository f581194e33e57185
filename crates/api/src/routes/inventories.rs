//! Inventory location endpoints. Admin only.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{InventoryId, Page};
use serde::Deserialize;
use store::{InventoryRecord, Store};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct InventoryRequest {
    pub location: String,
}

/// POST /inventories
#[tracing::instrument(skip(state))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Json(req): Json<InventoryRequest>,
) -> Result<(StatusCode, Json<InventoryRecord>), ApiError> {
    identity.require_admin()?;
    let inventory = state.inventories.create_inventory(&req.location).await?;
    Ok((StatusCode::CREATED, Json(inventory)))
}

/// GET /inventories
#[tracing::instrument(skip(state))]
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Query(page): Query<Page>,
) -> Result<Json<Vec<InventoryRecord>>, ApiError> {
    identity.require_admin()?;
    Ok(Json(state.inventories.list_inventories(page).await?))
}

/// GET /inventories/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<InventoryId>,
) -> Result<Json<InventoryRecord>, ApiError> {
    identity.require_admin()?;
    Ok(Json(state.inventories.get_inventory(id).await?))
}

/// PUT /inventories/{id}
#[tracing::instrument(skip(state))]
pub async fn update<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<InventoryId>,
    Json(req): Json<InventoryRequest>,
) -> Result<Json<InventoryRecord>, ApiError> {
    identity.require_admin()?;
    Ok(Json(
        state.inventories.update_inventory(id, &req.location).await?,
    ))
}

/// DELETE /inventories/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<InventoryId>,
) -> Result<StatusCode, ApiError> {
    identity.require_admin()?;
    state.inventories.delete_inventory(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
