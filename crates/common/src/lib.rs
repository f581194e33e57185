//! Shared vocabulary for the order backend: typed identifiers, money,
//! paging parameters and the status enumerations stored alongside orders,
//! deliveries, payments and users.

pub mod ids;
pub mod money;
pub mod page;
pub mod status;

pub use ids::{AddressId, InventoryId, LineItemId, OrderId, PaymentId, ProductId, UserId};
pub use money::Money;
pub use page::Page;
pub use status::{DeliveryStatus, OrderStatus, PaymentStatus, Role, UnknownStatus};
