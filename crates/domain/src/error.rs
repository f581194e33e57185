//! Domain error types.

use std::fmt;

use common::{AddressId, ProductId, UserId};
use store::StoreError;
use thiserror::Error;

/// The kinds of records a lookup can miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Address,
    Inventory,
    Product,
    Order,
    Payment,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::User => "User",
            Entity::Address => "Address",
            Entity::Inventory => "Inventory",
            Entity::Product => "Product",
            Entity::Order => "Order",
            Entity::Payment => "Payment",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The request is malformed.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// An order was requested without line items.
    #[error("Order must contain at least one item")]
    EmptyItems,

    #[error("{entity} not found: {key}")]
    NotFound { entity: Entity, key: String },

    #[error(
        "Insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: i64,
    },

    /// The address exists but belongs to someone else.
    #[error("Address {address_id} does not belong to user {user_id}")]
    InvalidAddress {
        address_id: AddressId,
        user_id: UserId,
    },

    /// The write clashes with existing data (duplicate key, row still referenced).
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Cannot change {field} from {from} to {to}")]
    InvalidTransition {
        field: &'static str,
        from: String,
        to: String,
    },

    /// An unexpected persistence failure, tagged with the operation that hit it.
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl DomainError {
    pub fn not_found(entity: Entity, key: impl fmt::Display) -> Self {
        DomainError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    /// Short machine-readable label, used as a metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation",
            DomainError::EmptyItems => "empty_items",
            DomainError::NotFound { .. } => "not_found",
            DomainError::InsufficientStock { .. } => "insufficient_stock",
            DomainError::InvalidAddress { .. } => "invalid_address",
            DomainError::Conflict(_) => "conflict",
            DomainError::InvalidTransition { .. } => "invalid_transition",
            DomainError::Store { .. } => "store",
        }
    }
}

/// Attaches operation context to store results.
pub(crate) trait StoreResultExt<T> {
    fn context(self, context: &'static str) -> Result<T, DomainError>;

    /// Like [`context`](Self::context), but a RESTRICT or unique violation
    /// becomes [`DomainError::Conflict`] with `message`.
    fn conflict_on_constraint(self, context: &'static str, message: &str)
    -> Result<T, DomainError>;
}

impl<T> StoreResultExt<T> for store::Result<T> {
    fn context(self, context: &'static str) -> Result<T, DomainError> {
        self.map_err(|source| DomainError::Store { context, source })
    }

    fn conflict_on_constraint(
        self,
        context: &'static str,
        message: &str,
    ) -> Result<T, DomainError> {
        self.map_err(|source| match source {
            StoreError::ForeignKeyViolation(_) | StoreError::UniqueViolation(_) => {
                DomainError::Conflict(message.to_owned())
            }
            source => DomainError::Store { context, source },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_key() {
        let err = DomainError::not_found(Entity::Order, 42);
        assert_eq!(err.to_string(), "Order not found: 42");
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn store_errors_keep_context() {
        let result: store::Result<()> = Err(StoreError::Corrupt {
            column: "status_order",
            value: "shipped".into(),
        });
        let err = result.context("order repo: create").unwrap_err();
        assert!(err.to_string().starts_with("order repo: create: "));
        assert_eq!(err.kind(), "store");
    }

    #[test]
    fn restrict_violations_become_conflicts() {
        let result: store::Result<bool> = Err(StoreError::ForeignKeyViolation(
            "orders_address_id_fkey".into(),
        ));
        let err = result
            .conflict_on_constraint("address repo: delete", "address is used by orders")
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(m) if m == "address is used by orders"));
    }
}
