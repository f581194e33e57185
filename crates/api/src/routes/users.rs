//! User account endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{Page, Role, UserId};
use domain::CreateUser;
use serde::Deserialize;
use store::{AddressRecord, Store, UserChanges, UserRecord};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::routes::AppState;

/// Registration body. The password is hashed upstream.
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

/// POST /users: open registration. Only admins may create admins.
#[tracing::instrument(skip(state, req), fields(email = %req.email, role = %req.role))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Option<Identity>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserRecord>), ApiError> {
    if req.role == Role::Admin {
        identity
            .ok_or_else(|| ApiError::Unauthorized("missing x-user-id header".to_string()))?
            .require_admin()?;
    }
    let user = state
        .users
        .create_user(CreateUser {
            name: req.name,
            email: req.email,
            password_hash: req.password_hash,
            role: req.role,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users
#[tracing::instrument(skip(state))]
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Query(page): Query<Page>,
) -> Result<Json<Vec<UserRecord>>, ApiError> {
    identity.require_admin()?;
    Ok(Json(state.users.list_users(page).await?))
}

/// GET /users/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<UserId>,
) -> Result<Json<UserRecord>, ApiError> {
    identity.require_self_or_admin(id)?;
    Ok(Json(state.users.get_user(id).await?))
}

/// GET /users/email/{email}
#[tracing::instrument(skip(state))]
pub async fn get_by_email<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(email): Path<String>,
) -> Result<Json<UserRecord>, ApiError> {
    identity.require_admin()?;
    Ok(Json(state.users.get_user_by_email(&email).await?))
}

/// PUT /users/{id}
#[tracing::instrument(skip(state, req))]
pub async fn update<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<UserId>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserRecord>, ApiError> {
    identity.require_self_or_admin(id)?;
    let changes = UserChanges {
        name: req.name,
        password_hash: req.password_hash,
    };
    Ok(Json(state.users.update_user(id, changes).await?))
}

/// DELETE /users/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<UserId>,
) -> Result<StatusCode, ApiError> {
    identity.require_admin()?;
    state.users.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/{id}/addresses
#[tracing::instrument(skip(state))]
pub async fn addresses<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<AddressRecord>>, ApiError> {
    identity.require_self_or_admin(id)?;
    Ok(Json(state.addresses.addresses_for_user(id).await?))
}
