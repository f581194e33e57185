//! Row types returned by the store and the input/change types it accepts.

use chrono::{DateTime, Utc};
use common::{
    AddressId, DeliveryStatus, InventoryId, LineItemId, Money, OrderId, OrderStatus, PaymentId,
    PaymentStatus, ProductId, Role, UserId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub id: AddressId,
    pub user_id: UserId,
    pub line: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: InventoryId,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub inventory_id: InventoryId,
    pub name: String,
    pub price: Money,
    pub stock: i64,
    pub description: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order header. Line items live in their own table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub user_id: UserId,
    pub address_id: AddressId,
    pub amount_pay: Money,
    pub status_order: OrderStatus,
    pub status_delivery: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// One product line of an order, with the unit price captured at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRecord {
    pub id: LineItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub qty: u32,
    pub unit_price: Money,
    pub created_at: DateTime<Utc>,
}

impl LineItemRecord {
    /// `unit_price * qty`, or `None` if it does not fit in a [`Money`].
    pub fn subtotal(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.qty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub image: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct NewAddress {
    pub user_id: UserId,
    pub line: String,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub inventory_id: InventoryId,
    pub name: String,
    pub price: Money,
    pub stock: i64,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub address_id: AddressId,
    pub status_order: OrderStatus,
    pub status_delivery: DeliveryStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    pub product_id: ProductId,
    pub qty: u32,
    pub unit_price: Money,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: OrderId,
    pub image: String,
    pub status: PaymentStatus,
}

/// Partial user update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

/// Partial product update. Stock is only moved through the stock ledger.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub inventory_id: Option<InventoryId>,
    pub name: Option<String>,
    pub price: Option<Money>,
    pub description: Option<String>,
}

/// Partial order status update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusChanges {
    pub status_order: Option<OrderStatus>,
    pub status_delivery: Option<DeliveryStatus>,
}

impl StatusChanges {
    pub fn is_empty(&self) -> bool {
        self.status_order.is_none() && self.status_delivery.is_none()
    }
}

/// Partial payment update.
#[derive(Debug, Clone, Default)]
pub struct PaymentChanges {
    pub status: Option<PaymentStatus>,
    pub image: Option<String>,
}

impl PaymentChanges {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.image.is_none()
    }
}
