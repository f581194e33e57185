//! Read model of an order with its user, address and products resolved.

use chrono::{DateTime, Utc};
use common::{
    AddressId, DeliveryStatus, LineItemId, Money, OrderId, OrderStatus, ProductId, UserId,
};
use serde::{Deserialize, Serialize};
use store::{AddressRecord, OrderRecord, ProductRecord, UnitOfWork, UserRecord};

use crate::error::{DomainError, Entity, StoreResultExt};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub id: OrderId,
    pub user: UserSummary,
    pub address: AddressSummary,
    pub items: Vec<OrderLine>,
    pub amount_pay: Money,
    pub status_order: OrderStatus,
    pub status_delivery: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSummary {
    pub id: AddressId,
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub image: String,
}

/// A line item with the price captured when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: LineItemId,
    pub product: ProductSummary,
    pub qty: u32,
    pub unit_price: Money,
    pub subtotal: Money,
}

impl OrderDetails {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of the line subtotals. Equals `amount_pay` for every stored order.
    pub fn items_total(&self) -> Option<Money> {
        Money::checked_sum(self.items.iter().map(|line| line.subtotal))
    }
}

impl From<UserRecord> for UserSummary {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

impl From<AddressRecord> for AddressSummary {
    fn from(address: AddressRecord) -> Self {
        Self {
            id: address.id,
            line: address.line,
        }
    }
}

impl From<ProductRecord> for ProductSummary {
    fn from(product: ProductRecord) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            image: product.image,
        }
    }
}

/// Loads a live order and everything it references.
pub(crate) async fn load_details<U: UnitOfWork>(
    uow: &mut U,
    order_id: OrderId,
) -> Result<Option<OrderDetails>, DomainError> {
    let Some(order) = uow.find_order(order_id).await.context("order repo: find")? else {
        return Ok(None);
    };
    assemble(uow, order).await.map(Some)
}

pub(crate) async fn assemble<U: UnitOfWork>(
    uow: &mut U,
    order: OrderRecord,
) -> Result<OrderDetails, DomainError> {
    let user = uow
        .find_user(order.user_id)
        .await
        .context("order repo: load user")?
        .ok_or_else(|| DomainError::not_found(Entity::User, order.user_id))?;
    let address = uow
        .find_address(order.address_id)
        .await
        .context("order repo: load address")?
        .ok_or_else(|| DomainError::not_found(Entity::Address, order.address_id))?;

    let records = uow
        .line_items_for_order(order.id)
        .await
        .context("order repo: load items")?;
    let mut items = Vec::with_capacity(records.len());
    for record in records {
        let product = uow
            .find_product(record.product_id)
            .await
            .context("order repo: load product")?
            .ok_or_else(|| DomainError::not_found(Entity::Product, record.product_id))?;
        let subtotal = record.subtotal().ok_or_else(|| {
            DomainError::validation(format!("line item {} subtotal overflows", record.id))
        })?;
        items.push(OrderLine {
            id: record.id,
            subtotal,
            product: product.into(),
            qty: record.qty,
            unit_price: record.unit_price,
        });
    }

    Ok(OrderDetails {
        id: order.id,
        user: user.into(),
        address: address.into(),
        items,
        amount_pay: order.amount_pay,
        status_order: order.status_order,
        status_delivery: order.status_delivery,
        created_at: order.created_at,
        updated_at: order.updated_at,
    })
}
