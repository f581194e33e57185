//! Order state machine.
//!
//! Order status:
//! ```text
//! waiting ──┬──► confirmed
//!           └──► canceled
//! ```
//!
//! Delivery status:
//! ```text
//! waiting ──┬──► on_process ──┬──► delivered
//!           │                 └──► canceled
//!           ├──► delivered
//!           └──► canceled
//! ```
//!
//! Re-applying the current value is always accepted as a no-op.

use common::{DeliveryStatus, OrderStatus};
use store::StatusChanges;

use crate::DomainError;

/// Order statuses under which the delivery address may still change.
pub const ADDRESS_EDITABLE: &[OrderStatus] = &[OrderStatus::Waiting];

/// Order statuses under which status updates are accepted.
pub const STATUS_EDITABLE: &[OrderStatus] = &[OrderStatus::Waiting, OrderStatus::Confirmed];

pub fn can_transition_order(from: OrderStatus, to: OrderStatus) -> bool {
    from == to
        || matches!(
            (from, to),
            (
                OrderStatus::Waiting,
                OrderStatus::Confirmed | OrderStatus::Canceled
            )
        )
}

pub fn can_transition_delivery(from: DeliveryStatus, to: DeliveryStatus) -> bool {
    use DeliveryStatus::*;

    from == to
        || matches!(
            (from, to),
            (Waiting, OnProcess | Delivered | Canceled) | (OnProcess, Delivered | Canceled)
        )
}

/// Checks a partial status update against the current statuses of an order.
pub fn check_status_changes(
    current_order: OrderStatus,
    current_delivery: DeliveryStatus,
    changes: &StatusChanges,
) -> Result<(), DomainError> {
    if changes.is_empty() {
        return Err(DomainError::validation(
            "at least one of status_order or status_delivery is required",
        ));
    }

    if let Some(to) = changes.status_order
        && !can_transition_order(current_order, to)
    {
        return Err(DomainError::InvalidTransition {
            field: "status_order",
            from: current_order.to_string(),
            to: to.to_string(),
        });
    }

    if let Some(to) = changes.status_delivery {
        if to == DeliveryStatus::Waiting && current_delivery != DeliveryStatus::Waiting {
            return Err(DomainError::validation(
                "status_delivery must be one of on_process, delivered, canceled",
            ));
        }
        if !can_transition_delivery(current_delivery, to) {
            return Err(DomainError::InvalidTransition {
                field: "status_delivery",
                from: current_delivery.to_string(),
                to: to.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_change(to: OrderStatus) -> StatusChanges {
        StatusChanges {
            status_order: Some(to),
            status_delivery: None,
        }
    }

    fn delivery_change(to: DeliveryStatus) -> StatusChanges {
        StatusChanges {
            status_order: None,
            status_delivery: Some(to),
        }
    }

    #[test]
    fn waiting_order_can_be_confirmed_or_canceled() {
        assert!(can_transition_order(OrderStatus::Waiting, OrderStatus::Confirmed));
        assert!(can_transition_order(OrderStatus::Waiting, OrderStatus::Canceled));
    }

    #[test]
    fn confirmed_order_only_accepts_reconfirmation() {
        assert!(can_transition_order(OrderStatus::Confirmed, OrderStatus::Confirmed));
        assert!(!can_transition_order(OrderStatus::Confirmed, OrderStatus::Canceled));
        assert!(!can_transition_order(OrderStatus::Confirmed, OrderStatus::Waiting));
    }

    #[test]
    fn canceled_order_is_terminal() {
        assert!(!can_transition_order(OrderStatus::Canceled, OrderStatus::Confirmed));
        assert!(!can_transition_order(OrderStatus::Canceled, OrderStatus::Waiting));
    }

    #[test]
    fn delivery_moves_forward_only() {
        use DeliveryStatus::*;

        assert!(can_transition_delivery(Waiting, OnProcess));
        assert!(can_transition_delivery(Waiting, Delivered));
        assert!(can_transition_delivery(OnProcess, Delivered));
        assert!(can_transition_delivery(OnProcess, Canceled));
        assert!(!can_transition_delivery(Delivered, Canceled));
        assert!(!can_transition_delivery(Canceled, OnProcess));
        assert!(!can_transition_delivery(OnProcess, Waiting));
        assert!(can_transition_delivery(Delivered, Delivered));
    }

    #[test]
    fn empty_update_is_a_validation_error() {
        let err = check_status_changes(
            OrderStatus::Waiting,
            DeliveryStatus::Waiting,
            &StatusChanges::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn reconfirming_is_accepted() {
        check_status_changes(
            OrderStatus::Confirmed,
            DeliveryStatus::Waiting,
            &order_change(OrderStatus::Confirmed),
        )
        .unwrap();
    }

    #[test]
    fn canceling_confirmed_order_is_invalid_transition() {
        let err = check_status_changes(
            OrderStatus::Confirmed,
            DeliveryStatus::Waiting,
            &order_change(OrderStatus::Canceled),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition {
                field: "status_order",
                ..
            }
        ));
    }

    #[test]
    fn delivery_cannot_return_to_waiting() {
        let err = check_status_changes(
            OrderStatus::Confirmed,
            DeliveryStatus::OnProcess,
            &delivery_change(DeliveryStatus::Waiting),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn delivered_cannot_be_canceled() {
        let err = check_status_changes(
            OrderStatus::Confirmed,
            DeliveryStatus::Delivered,
            &delivery_change(DeliveryStatus::Canceled),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "invalid_transition");
    }
}
