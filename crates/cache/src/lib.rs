//! Cache gateway used by the order and product services.
//!
//! Reads go through [`read_through`]; writes hand [`Invalidation`] messages
//! to [`invalidate`], which never fails the caller.

pub mod error;
pub mod gateway;
pub mod keys;
pub mod memory;

pub use error::{CacheError, Result};
pub use gateway::{CacheGateway, DEFAULT_TTL, Invalidation, invalidate, read_through};
pub use memory::InMemoryCache;
