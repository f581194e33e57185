//! Transactional order placement.

use common::{DeliveryStatus, Money, OrderStatus};
use store::{NewLineItem, NewOrder, OrderRecord, UnitOfWork};

use super::requests::{CreateOrder, OrderItemRequest};
use crate::error::{DomainError, Entity, StoreResultExt};
use crate::stock;

/// Writes a new order, its line items and the stock decrements into `uow`.
///
/// `items` must already be validated and merged. Nothing is committed here;
/// on error the caller drops the unit of work and every write is undone.
pub(crate) async fn place_order<U: UnitOfWork>(
    uow: &mut U,
    request: &CreateOrder,
    items: &[OrderItemRequest],
) -> Result<OrderRecord, DomainError> {
    uow.find_user(request.user_id)
        .await
        .context("order repo: find user")?
        .ok_or_else(|| DomainError::not_found(Entity::User, request.user_id))?;

    let address = uow
        .find_address(request.address_id)
        .await
        .context("order repo: find address")?
        .ok_or_else(|| DomainError::not_found(Entity::Address, request.address_id))?;
    if address.user_id != request.user_id {
        return Err(DomainError::InvalidAddress {
            address_id: address.id,
            user_id: request.user_id,
        });
    }

    let mut order = uow
        .insert_order(&NewOrder {
            user_id: request.user_id,
            address_id: address.id,
            status_order: OrderStatus::Waiting,
            status_delivery: DeliveryStatus::Waiting,
        })
        .await
        .context("order repo: create")?;

    // Lock rows in ascending id order so concurrent orders over the same
    // products cannot deadlock.
    let mut by_product: Vec<&OrderItemRequest> = items.iter().collect();
    by_product.sort_by_key(|item| item.product_id);
    for item in by_product {
        stock::decrement(uow, item.product_id, item.qty).await?;
    }

    // Every product row is locked now; snapshot prices in request order.
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let product = uow
            .find_product(item.product_id)
            .await
            .context("order repo: find product")?
            .ok_or_else(|| DomainError::not_found(Entity::Product, item.product_id))?;
        lines.push(NewLineItem {
            product_id: product.id,
            qty: item.qty,
            unit_price: product.price,
        });
    }
    let amount = order_total(&lines)
        .ok_or_else(|| DomainError::validation("order total is too large"))?;

    uow.insert_line_items(order.id, &lines)
        .await
        .context("order repo: create items")?;
    uow.set_order_amount(order.id, amount)
        .await
        .context("order repo: set amount")?;
    order.amount_pay = amount;

    Ok(order)
}

fn order_total(lines: &[NewLineItem]) -> Option<Money> {
    lines.iter().try_fold(Money::zero(), |total, line| {
        total.checked_add(line.unit_price.checked_mul(line.qty)?)
    })
}
