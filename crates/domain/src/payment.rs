//! Payment reconciliation.
//!
//! Payments are manually reviewed receipts attached to an order. Their status
//! is tracked independently of the order status.

use common::{OrderId, Page, PaymentId, PaymentStatus};
use store::{NewPayment, PaymentChanges, PaymentRecord, Store, UnitOfWork};

use crate::error::{DomainError, Entity, StoreResultExt};
use crate::validation::{optional_text, require_text};

const MAX_IMAGE_PATH: usize = 255;

/// Request to attach a payment receipt to an order.
#[derive(Debug, Clone)]
pub struct UploadPayment {
    pub order_id: OrderId,
    /// Path of the already stored receipt image.
    pub image: String,
}

#[derive(Clone)]
pub struct PaymentService<S: Store> {
    store: S,
}

impl<S: Store> PaymentService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Records a receipt for an existing order with status `waiting`.
    #[tracing::instrument(skip(self))]
    pub async fn upload_payment(&self, cmd: UploadPayment) -> Result<PaymentRecord, DomainError> {
        require_text("image", &cmd.image, MAX_IMAGE_PATH)?;

        let mut tx = self.store.begin().await.context("payment repo: begin")?;
        tx.find_order(cmd.order_id)
            .await
            .context("payment repo: find order")?
            .ok_or_else(|| DomainError::not_found(Entity::Order, cmd.order_id))?;

        let payment = tx
            .insert_payment(&NewPayment {
                order_id: cmd.order_id,
                image: cmd.image,
                status: PaymentStatus::Waiting,
            })
            .await
            .context("payment repo: create")?;
        tx.commit().await.context("payment repo: commit")?;

        tracing::info!(payment_id = %payment.id, order_id = %payment.order_id, "payment uploaded");
        Ok(payment)
    }

    /// Updates the most recent payment of an order.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: OrderId,
        changes: PaymentChanges,
    ) -> Result<PaymentRecord, DomainError> {
        if changes.is_empty() {
            return Err(DomainError::validation(
                "at least one of status or image is required",
            ));
        }
        optional_text("image", changes.image.as_deref(), MAX_IMAGE_PATH)?;

        let mut tx = self.store.begin().await.context("payment repo: begin")?;
        tx.find_order(order_id)
            .await
            .context("payment repo: find order")?
            .ok_or_else(|| DomainError::not_found(Entity::Order, order_id))?;
        let latest = tx
            .find_latest_payment_for_order(order_id)
            .await
            .context("payment repo: find latest")?
            .ok_or_else(|| DomainError::not_found(Entity::Payment, format!("order {order_id}")))?;

        let payment = tx
            .update_payment(latest.id, &changes)
            .await
            .context("payment repo: update")?
            .ok_or_else(|| DomainError::not_found(Entity::Payment, latest.id))?;
        tx.commit().await.context("payment repo: commit")?;

        tracing::info!(payment_id = %payment.id, status = %payment.status, "payment updated");
        Ok(payment)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_payment(&self, id: PaymentId) -> Result<PaymentRecord, DomainError> {
        let mut tx = self.store.begin().await.context("payment repo: begin")?;
        tx.find_payment(id)
            .await
            .context("payment repo: find")?
            .ok_or_else(|| DomainError::not_found(Entity::Payment, id))
    }

    /// The payment currently tracked for an order.
    #[tracing::instrument(skip(self))]
    pub async fn payment_for_order(&self, order_id: OrderId) -> Result<PaymentRecord, DomainError> {
        let mut tx = self.store.begin().await.context("payment repo: begin")?;
        tx.find_order(order_id)
            .await
            .context("payment repo: find order")?
            .ok_or_else(|| DomainError::not_found(Entity::Order, order_id))?;
        tx.find_latest_payment_for_order(order_id)
            .await
            .context("payment repo: find latest")?
            .ok_or_else(|| DomainError::not_found(Entity::Payment, format!("order {order_id}")))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_payments(&self, page: Page) -> Result<Vec<PaymentRecord>, DomainError> {
        let mut tx = self.store.begin().await.context("payment repo: begin")?;
        tx.list_payments(page).await.context("payment repo: list")
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_payment(&self, id: PaymentId) -> Result<(), DomainError> {
        let mut tx = self.store.begin().await.context("payment repo: begin")?;
        if !tx.delete_payment(id).await.context("payment repo: delete")? {
            return Err(DomainError::not_found(Entity::Payment, id));
        }
        tx.commit().await.context("payment repo: commit")
    }
}
