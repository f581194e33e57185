//! Payment receipt endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{OrderId, Page, PaymentId};
use domain::UploadPayment;
use serde::Deserialize;
use store::{PaymentRecord, Store};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::routes::AppState;
use crate::routes::orders::visible_order;

#[derive(Debug, Deserialize)]
pub struct UploadPaymentRequest {
    pub order_id: OrderId,
    pub image_path: String,
}

/// POST /payments: attach a receipt to one of the caller's orders.
#[tracing::instrument(skip(state))]
pub async fn upload<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Json(req): Json<UploadPaymentRequest>,
) -> Result<(StatusCode, Json<PaymentRecord>), ApiError> {
    visible_order(&state, &identity, req.order_id).await?;
    let payment = state
        .payments
        .upload_payment(UploadPayment {
            order_id: req.order_id,
            image: req.image_path,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// GET /payments
#[tracing::instrument(skip(state))]
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Query(page): Query<Page>,
) -> Result<Json<Vec<PaymentRecord>>, ApiError> {
    identity.require_admin()?;
    Ok(Json(state.payments.list_payments(page).await?))
}

/// GET /payments/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<PaymentId>,
) -> Result<Json<PaymentRecord>, ApiError> {
    identity.require_admin()?;
    Ok(Json(state.payments.get_payment(id).await?))
}

/// DELETE /payments/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<PaymentId>,
) -> Result<StatusCode, ApiError> {
    identity.require_admin()?;
    state.payments.delete_payment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
