//! Product catalogue endpoints. Reads are public, writes need an admin.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{InventoryId, Money, Page, ProductId};
use domain::CreateProduct;
use serde::Deserialize;
use store::{ProductChanges, ProductRecord, Store};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::routes::AppState;

/// Prices are in cents.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub inventory_id: InventoryId,
    pub name: String,
    pub price: Money,
    pub stock: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_path: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub inventory_id: Option<InventoryId>,
    pub name: Option<String>,
    pub price: Option<Money>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StockRequest {
    pub qty: u32,
}

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub image_path: String,
}

/// GET /products
#[tracing::instrument(skip(state))]
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<ProductRecord>>, ApiError> {
    Ok(Json(state.products.list_products(page).await?))
}

/// GET /products/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductRecord>, ApiError> {
    Ok(Json(state.products.get_product(id).await?))
}

/// POST /products
#[tracing::instrument(skip(state))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductRecord>), ApiError> {
    identity.require_admin()?;
    let product = state
        .products
        .create_product(CreateProduct {
            inventory_id: req.inventory_id,
            name: req.name,
            price: req.price,
            stock: req.stock,
            description: req.description,
            image: req.image_path,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /products/{id}
#[tracing::instrument(skip(state))]
pub async fn update<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<ProductId>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductRecord>, ApiError> {
    identity.require_admin()?;
    let changes = ProductChanges {
        inventory_id: req.inventory_id,
        name: req.name,
        price: req.price,
        description: req.description,
    };
    Ok(Json(state.products.update_product(id, changes).await?))
}

/// DELETE /products/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<ProductId>,
) -> Result<StatusCode, ApiError> {
    identity.require_admin()?;
    state.products.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /products/{id}/stock/add
#[tracing::instrument(skip(state))]
pub async fn add_stock<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<ProductId>,
    Json(req): Json<StockRequest>,
) -> Result<Json<ProductRecord>, ApiError> {
    identity.require_admin()?;
    Ok(Json(state.products.add_stock(id, req.qty).await?))
}

/// PUT /products/{id}/stock/reduce
#[tracing::instrument(skip(state))]
pub async fn reduce_stock<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<ProductId>,
    Json(req): Json<StockRequest>,
) -> Result<Json<ProductRecord>, ApiError> {
    identity.require_admin()?;
    Ok(Json(state.products.reduce_stock(id, req.qty).await?))
}

/// PUT /products/{id}/image
#[tracing::instrument(skip(state))]
pub async fn set_image<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<ProductId>,
    Json(req): Json<ImageRequest>,
) -> Result<Json<ProductRecord>, ApiError> {
    identity.require_admin()?;
    Ok(Json(state.products.set_image(id, req.image_path).await?))
}
