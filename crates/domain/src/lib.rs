//! Domain layer for the order backend.
//!
//! This crate provides:
//! - the stock ledger, the only code that moves product stock
//! - order placement, the order/delivery state machine and cached order reads
//! - payment reconciliation
//! - catalogue (products, inventory locations) and customer (users, addresses)
//!   services

pub mod catalog;
pub mod customer;
pub mod error;
pub mod order;
pub mod payment;
pub mod stock;
mod validation;

pub use catalog::{CreateProduct, InventoryService, ProductService};
pub use customer::{AddressService, CreateUser, UserService};
pub use error::{DomainError, Entity};
pub use order::{
    AddressSummary, CreateOrder, OrderDetails, OrderItemRequest, OrderLine, OrderService,
    ProductSummary, UpdateOrderAddress, UpdateOrderStatus, UserSummary,
};
pub use payment::{PaymentService, UploadPayment};
