//! HTTP handlers, one module per resource.

pub mod addresses;
pub mod health;
pub mod inventories;
pub mod metrics;
pub mod orders;
pub mod payments;
pub mod products;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use cache::CacheGateway;
use domain::{
    AddressService, InventoryService, OrderService, PaymentService, ProductService, UserService,
};
use store::Store;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub orders: OrderService<S>,
    pub payments: PaymentService<S>,
    pub products: ProductService<S>,
    pub inventories: InventoryService<S>,
    pub users: UserService<S>,
    pub addresses: AddressService<S>,
}

impl<S: Store> AppState<S> {
    /// Wires every service to the same store and cache.
    pub fn new(store: S, cache: Arc<dyn CacheGateway>, cache_ttl: Duration) -> Self {
        Self {
            orders: OrderService::new(store.clone(), cache.clone()).with_ttl(cache_ttl),
            payments: PaymentService::new(store.clone()),
            products: ProductService::new(store.clone(), cache).with_ttl(cache_ttl),
            inventories: InventoryService::new(store.clone()),
            users: UserService::new(store.clone()),
            addresses: AddressService::new(store),
        }
    }
}
