//! Order requests.

use common::{AddressId, OrderId, ProductId, UserId};
use serde::Deserialize;
use store::StatusChanges;

use crate::DomainError;

/// One requested product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub qty: u32,
}

impl OrderItemRequest {
    pub fn new(product_id: ProductId, qty: u32) -> Self {
        Self { product_id, qty }
    }
}

/// Request to place an order.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// The user placing the order.
    pub user_id: UserId,

    /// Delivery address; must belong to `user_id`.
    pub address_id: AddressId,

    pub items: Vec<OrderItemRequest>,
}

impl CreateOrder {
    pub fn new(user_id: UserId, address_id: AddressId, items: Vec<OrderItemRequest>) -> Self {
        Self {
            user_id,
            address_id,
            items,
        }
    }

    /// Validates the item list and folds repeated products into one line.
    ///
    /// Quantities of a repeated product are summed into the position of its
    /// first occurrence.
    pub fn merged_items(&self) -> Result<Vec<OrderItemRequest>, DomainError> {
        if self.items.is_empty() {
            return Err(DomainError::EmptyItems);
        }

        let mut merged: Vec<OrderItemRequest> = Vec::with_capacity(self.items.len());
        for item in &self.items {
            if item.qty == 0 {
                return Err(DomainError::validation(format!(
                    "qty for product {} must be greater than zero",
                    item.product_id
                )));
            }
            match merged.iter_mut().find(|m| m.product_id == item.product_id) {
                Some(existing) => {
                    existing.qty = existing.qty.checked_add(item.qty).ok_or_else(|| {
                        DomainError::validation(format!(
                            "qty for product {} is too large",
                            item.product_id
                        ))
                    })?;
                }
                None => merged.push(*item),
            }
        }
        Ok(merged)
    }
}

/// Request to move a waiting order to another address of the same user.
#[derive(Debug, Clone, Copy)]
pub struct UpdateOrderAddress {
    pub order_id: OrderId,
    pub address_id: AddressId,
}

impl UpdateOrderAddress {
    pub fn new(order_id: OrderId, address_id: AddressId) -> Self {
        Self {
            order_id,
            address_id,
        }
    }
}

/// Partial update of the order and delivery statuses.
#[derive(Debug, Clone, Copy)]
pub struct UpdateOrderStatus {
    pub order_id: OrderId,
    pub changes: StatusChanges,
}

impl UpdateOrderStatus {
    pub fn new(order_id: OrderId, changes: StatusChanges) -> Self {
        Self { order_id, changes }
    }
}
