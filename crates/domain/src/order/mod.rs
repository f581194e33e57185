//! Orders: placement, fulfilment state machine and read model.

mod builder;
pub mod details;
pub mod requests;
pub mod service;
pub mod state;

pub use details::{AddressSummary, OrderDetails, OrderLine, ProductSummary, UserSummary};
pub use requests::{CreateOrder, OrderItemRequest, UpdateOrderAddress, UpdateOrderStatus};
pub use service::OrderService;
