//! Persistence gateway for the order backend.
//!
//! All access goes through [`Store::begin`] and the returned [`UnitOfWork`].
//! Two backends are provided: [`PostgresStore`] and [`InMemoryStore`].

pub mod error;
pub mod memory;
pub mod postgres;
pub mod records;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{InMemoryStore, InMemoryTx};
pub use postgres::{PostgresStore, PostgresTx};
pub use records::{
    AddressRecord, InventoryRecord, LineItemRecord, NewAddress, NewLineItem, NewOrder, NewPayment,
    NewProduct, NewUser, OrderRecord, PaymentChanges, PaymentRecord, ProductChanges,
    ProductRecord, StatusChanges, UserChanges, UserRecord,
};
pub use store::{Store, UnitOfWork};
