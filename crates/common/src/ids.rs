use serde::{Deserialize, Serialize};

/// Declares a typed wrapper around a database-assigned `BIGSERIAL` identity.
///
/// Each entity gets its own type so an address id can never be passed where
/// a product id is expected.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identity value.
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw identity value.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(
    /// Identifier of a registered user.
    UserId
);
entity_id!(
    /// Identifier of a shipping address.
    AddressId
);
entity_id!(
    /// Identifier of an inventory location.
    InventoryId
);
entity_id!(
    /// Identifier of a product.
    ProductId
);
entity_id!(
    /// Identifier of an order.
    OrderId
);
entity_id!(
    /// Identifier of a single order line item.
    LineItemId
);
entity_id!(
    /// Identifier of a payment receipt.
    PaymentId
);
