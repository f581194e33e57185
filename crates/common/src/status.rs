//! Status vocabularies persisted as lowercase text columns.
//!
//! Only the value sets live here; which transitions are legal is decided by
//! the domain layer.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored or submitted status string that is not part of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownStatus {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Returns the stored text form.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownStatus;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownStatus {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Commercial state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, not yet reviewed. Address can still change.
    #[default]
    Waiting,
    /// Accepted by an operator.
    Confirmed,
    /// Rejected or withdrawn. Immutable from here on.
    Canceled,
}

text_enum!(OrderStatus, "order status", {
    Waiting => "waiting",
    Confirmed => "confirmed",
    Canceled => "canceled",
});

/// Shipping state of an order, tracked independently of [`OrderStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    Waiting,
    OnProcess,
    Delivered,
    Canceled,
}

text_enum!(DeliveryStatus, "delivery status", {
    Waiting => "waiting",
    OnProcess => "on_process",
    Delivered => "delivered",
    Canceled => "canceled",
});

/// Reconciliation state of an uploaded payment receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Waiting,
    Confirmed,
    Canceled,
}

text_enum!(PaymentStatus, "payment status", {
    Waiting => "waiting",
    Confirmed => "confirmed",
    Canceled => "canceled",
});

/// Access role carried by an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Customer,
}

text_enum!(Role, "role", {
    Admin => "admin",
    Customer => "customer",
});
