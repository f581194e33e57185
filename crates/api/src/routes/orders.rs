//! Order placement, lookup and fulfilment endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{AddressId, DeliveryStatus, OrderId, OrderStatus, Page, PaymentStatus};
use domain::{
    CreateOrder, DomainError, Entity, OrderDetails, OrderItemRequest, UpdateOrderAddress,
    UpdateOrderStatus,
};
use serde::Deserialize;
use store::{PaymentChanges, PaymentRecord, StatusChanges, Store};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::routes::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub address_id: AddressId,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAddressRequest {
    pub address_id: AddressId,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status_order: Option<OrderStatus>,
    pub status_delivery: Option<DeliveryStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub status: Option<PaymentStatus>,
    pub image_path: Option<String>,
}

// -- Handlers --

/// POST /orders: place an order for the calling user.
#[tracing::instrument(skip(state, req), fields(user_id = %identity.user_id))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderDetails>), ApiError> {
    let cmd = CreateOrder::new(identity.user_id, req.address_id, req.items);
    let order = state.orders.create_order(cmd).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders
#[tracing::instrument(skip(state))]
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Query(page): Query<Page>,
) -> Result<Json<Vec<OrderDetails>>, ApiError> {
    identity.require_admin()?;
    Ok(Json(state.orders.list_orders(page).await?))
}

/// GET /orders/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetails>, ApiError> {
    Ok(Json(visible_order(&state, &identity, id).await?))
}

/// PUT /orders/{id}/address: only while the order is still waiting.
#[tracing::instrument(skip(state))]
pub async fn update_address<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<OrderId>,
    Json(req): Json<UpdateAddressRequest>,
) -> Result<Json<OrderDetails>, ApiError> {
    visible_order(&state, &identity, id).await?;
    let order = state
        .orders
        .update_address(UpdateOrderAddress::new(id, req.address_id))
        .await?;
    Ok(Json(order))
}

/// PUT /orders/{id}/status
#[tracing::instrument(skip(state))]
pub async fn update_status<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<OrderId>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderDetails>, ApiError> {
    identity.require_admin()?;
    let changes = StatusChanges {
        status_order: req.status_order,
        status_delivery: req.status_delivery,
    };
    let order = state
        .orders
        .update_status(UpdateOrderStatus::new(id, changes))
        .await?;
    Ok(Json(order))
}

/// DELETE /orders/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<OrderId>,
) -> Result<StatusCode, ApiError> {
    identity.require_admin()?;
    state.orders.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /orders/{id}/payment: the latest receipt uploaded for the order.
#[tracing::instrument(skip(state))]
pub async fn payment<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<OrderId>,
) -> Result<Json<PaymentRecord>, ApiError> {
    visible_order(&state, &identity, id).await?;
    Ok(Json(state.payments.payment_for_order(id).await?))
}

/// PUT /orders/{id}/payment/status
#[tracing::instrument(skip(state))]
pub async fn update_payment_status<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<OrderId>,
    Json(req): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<PaymentRecord>, ApiError> {
    identity.require_admin()?;
    let changes = PaymentChanges {
        status: req.status,
        image: req.image_path,
    };
    Ok(Json(state.payments.update_status(id, changes).await?))
}

/// Loads an order the caller may see. Other customers' orders look missing.
pub(crate) async fn visible_order<S: Store>(
    state: &AppState<S>,
    identity: &Identity,
    id: OrderId,
) -> Result<OrderDetails, ApiError> {
    let order = state.orders.get_order(id).await?;
    if identity.is_admin() || order.user.id == identity.user_id {
        Ok(order)
    } else {
        Err(DomainError::not_found(Entity::Order, id).into())
    }
}
