//! Delivery address endpoints.
//!
//! Customers manage their own addresses; another user's address answers 404.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{AddressId, Page, UserId};
use serde::Deserialize;
use store::{AddressRecord, Store};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateAddressRequest {
    /// Defaults to the caller.
    pub user_id: Option<UserId>,
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAddressRequest {
    pub address: String,
}

/// POST /addresses
#[tracing::instrument(skip(state))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Json(req): Json<CreateAddressRequest>,
) -> Result<(StatusCode, Json<AddressRecord>), ApiError> {
    let user_id = req.user_id.unwrap_or(identity.user_id);
    identity.require_self_or_admin(user_id)?;
    let address = state
        .addresses
        .create_address(user_id, &req.address)
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// GET /addresses
#[tracing::instrument(skip(state))]
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Query(page): Query<Page>,
) -> Result<Json<Vec<AddressRecord>>, ApiError> {
    identity.require_admin()?;
    Ok(Json(state.addresses.list_addresses(page).await?))
}

/// PUT /addresses/{id}
#[tracing::instrument(skip(state))]
pub async fn update<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<AddressId>,
    Json(req): Json<UpdateAddressRequest>,
) -> Result<Json<AddressRecord>, ApiError> {
    let address = state
        .addresses
        .update_address(id, identity.owner_scope(), &req.address)
        .await?;
    Ok(Json(address))
}

/// DELETE /addresses/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<AddressId>,
) -> Result<StatusCode, ApiError> {
    state
        .addresses
        .delete_address(id, identity.owner_scope())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
