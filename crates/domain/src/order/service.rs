//! Order service: placement, address and status changes, cached lookups.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cache::{CacheGateway, DEFAULT_TTL, Invalidation, invalidate, keys, read_through};
use common::{OrderId, Page};
use store::{Store, UnitOfWork};

use super::builder::place_order;
use super::details::{OrderDetails, assemble, load_details};
use super::requests::{CreateOrder, UpdateOrderAddress, UpdateOrderStatus};
use super::state::{ADDRESS_EDITABLE, STATUS_EDITABLE, check_status_changes};
use crate::error::{DomainError, Entity, StoreResultExt};

/// Service for managing orders.
///
/// Every write runs in one unit of work and, once committed, invalidates the
/// cache entries it made stale.
#[derive(Clone)]
pub struct OrderService<S: Store> {
    store: S,
    cache: Arc<dyn CacheGateway>,
    ttl: Duration,
}

impl<S: Store> OrderService<S> {
    /// Creates a new order service using the default cache TTL.
    pub fn new(store: S, cache: Arc<dyn CacheGateway>) -> Self {
        Self {
            store,
            cache,
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Places an order, taking the ordered quantities out of stock.
    ///
    /// Either the order, all its line items and every stock decrement are
    /// stored, or nothing is.
    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.user_id, address_id = %cmd.address_id))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<OrderDetails, DomainError> {
        let started = Instant::now();
        let result = self.try_create_order(&cmd).await;

        match &result {
            Ok(order) => {
                metrics::counter!("orders_created_total").increment(1);
                metrics::histogram!("order_create_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                tracing::info!(order_id = %order.id, amount_pay = %order.amount_pay, "order created");
            }
            Err(e) => {
                metrics::counter!("orders_rejected_total", "reason" => e.kind()).increment(1);
                tracing::warn!(error = %e, "order rejected");
            }
        }

        result
    }

    async fn try_create_order(&self, cmd: &CreateOrder) -> Result<OrderDetails, DomainError> {
        let items = cmd.merged_items()?;

        let mut tx = self.store.begin().await.context("order repo: begin")?;
        let order = place_order(&mut tx, cmd, &items).await?;
        tx.commit().await.context("order repo: commit")?;

        let mut stale = vec![
            Invalidation::order(order.id),
            Invalidation::order_pages(),
            Invalidation::product_pages(),
        ];
        stale.extend(items.iter().map(|item| Invalidation::product(item.product_id)));
        invalidate(self.cache.as_ref(), &stale).await;

        self.load_order(order.id).await
    }

    /// Moves a waiting order to another address of the same user.
    ///
    /// Orders that are no longer waiting are reported as not found.
    #[tracing::instrument(skip(self))]
    pub async fn update_address(
        &self,
        cmd: UpdateOrderAddress,
    ) -> Result<OrderDetails, DomainError> {
        let mut tx = self.store.begin().await.context("order repo: begin")?;

        let order = tx
            .find_order_in(cmd.order_id, ADDRESS_EDITABLE)
            .await
            .context("order repo: find")?
            .ok_or_else(|| DomainError::not_found(Entity::Order, cmd.order_id))?;
        let address = tx
            .find_address(cmd.address_id)
            .await
            .context("order repo: find address")?
            .ok_or_else(|| DomainError::not_found(Entity::Address, cmd.address_id))?;
        if address.user_id != order.user_id {
            return Err(DomainError::InvalidAddress {
                address_id: address.id,
                user_id: order.user_id,
            });
        }

        let updated = tx
            .update_order_address(order.id, address.id)
            .await
            .context("order repo: update address")?
            .ok_or_else(|| DomainError::not_found(Entity::Order, order.id))?;
        let details = assemble(&mut tx, updated).await?;
        tx.commit().await.context("order repo: commit")?;

        self.invalidate_order(order.id).await;
        tracing::info!(order_id = %order.id, address_id = %address.id, "order address changed");
        Ok(details)
    }

    /// Applies a partial order/delivery status update.
    ///
    /// Canceled orders are reported as not found.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, cmd: UpdateOrderStatus) -> Result<OrderDetails, DomainError> {
        if cmd.changes.is_empty() {
            return Err(DomainError::validation(
                "at least one of status_order or status_delivery is required",
            ));
        }

        let mut tx = self.store.begin().await.context("order repo: begin")?;

        let order = tx
            .find_order_in(cmd.order_id, STATUS_EDITABLE)
            .await
            .context("order repo: find")?
            .ok_or_else(|| DomainError::not_found(Entity::Order, cmd.order_id))?;
        check_status_changes(order.status_order, order.status_delivery, &cmd.changes)?;

        let updated = tx
            .update_order_status(order.id, &cmd.changes)
            .await
            .context("order repo: update status")?
            .ok_or_else(|| DomainError::not_found(Entity::Order, order.id))?;
        let details = assemble(&mut tx, updated).await?;
        tx.commit().await.context("order repo: commit")?;

        self.invalidate_order(order.id).await;
        tracing::info!(
            order_id = %order.id,
            status_order = %details.status_order,
            status_delivery = %details.status_delivery,
            "order status changed"
        );
        Ok(details)
    }

    /// Loads an order through the cache.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<OrderDetails, DomainError> {
        read_through(self.cache.as_ref(), &keys::order(order_id), self.ttl, || {
            self.load_order(order_id)
        })
        .await
    }

    /// Lists live orders by ascending id, through the cache.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, page: Page) -> Result<Vec<OrderDetails>, DomainError> {
        let page = page.normalized();
        read_through(self.cache.as_ref(), &keys::order_page(page), self.ttl, || async move {
            let mut tx = self.store.begin().await.context("order repo: begin")?;
            let orders = tx.list_orders(page).await.context("order repo: list")?;
            let mut details = Vec::with_capacity(orders.len());
            for order in orders {
                details.push(assemble(&mut tx, order).await?);
            }
            Ok(details)
        })
        .await
    }

    /// Soft-deletes an order. It disappears from every lookup.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<(), DomainError> {
        let mut tx = self.store.begin().await.context("order repo: begin")?;
        let deleted = tx
            .soft_delete_order(order_id)
            .await
            .context("order repo: delete")?;
        if !deleted {
            return Err(DomainError::not_found(Entity::Order, order_id));
        }
        tx.commit().await.context("order repo: commit")?;

        self.invalidate_order(order_id).await;
        tracing::info!(%order_id, "order deleted");
        Ok(())
    }

    async fn load_order(&self, order_id: OrderId) -> Result<OrderDetails, DomainError> {
        let mut tx = self.store.begin().await.context("order repo: begin")?;
        load_details(&mut tx, order_id)
            .await?
            .ok_or_else(|| DomainError::not_found(Entity::Order, order_id))
    }

    async fn invalidate_order(&self, order_id: OrderId) {
        invalidate(
            self.cache.as_ref(),
            &[Invalidation::order(order_id), Invalidation::order_pages()],
        )
        .await;
    }
}
