//! The order-item state machine and the order-status aggregation.
//!
//! Both are pure: they decide what should happen, the application service
//! applies the resulting effects and persists the outcome.

use super::errors::DomainError;
use super::order::{OrderItem, OrderStatus};

/// Inventory effect attached to an allowed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    /// No ingredient movement.
    None,
    /// Each ingredient of the item's product loses one unit.
    Consume,
    /// Each ingredient of the item's product gains one unit.
    Restock,
}

impl StockEffect {
    pub fn apply(&self, quantity: i64) -> i64 {
        match self {
            StockEffect::None => quantity,
            StockEffect::Consume => quantity - 1,
            StockEffect::Restock => quantity + 1,
        }
    }
}

/// Decide whether `requested` is a legal next status for `item`.
///
/// Deliver and Cancel are terminal towards each other: once delivered an item
/// cannot be cancelled and once cancelled it cannot be delivered. Both can be
/// reversed to Pending, and the Deliver reversal puts the consumed stock
/// back. Requesting the current status again is always an error.
pub fn plan_transition(
    item: &OrderItem,
    requested: OrderStatus,
) -> Result<StockEffect, DomainError> {
    use OrderStatus::{Cancel, Deliver, Pending};

    match (item.status, requested) {
        (Pending, Deliver) => Ok(StockEffect::Consume),
        (Pending, Cancel) => Ok(StockEffect::None),
        (Deliver, Pending) => Ok(StockEffect::Restock),
        (Cancel, Pending) => Ok(StockEffect::None),
        (Pending, Pending)
        | (Deliver, Deliver)
        | (Cancel, Cancel)
        | (Deliver, Cancel)
        | (Cancel, Deliver) => Err(DomainError::InvalidItemStatus {
            item_id: item.id,
            status: requested,
        }),
    }
}

/// Recompute an order's status from its items.
///
/// Priority is Pending > Deliver > Cancel: any pending item keeps the order
/// at its current status (the order is not finalized yet); otherwise one
/// delivered item is enough for Deliver, and an all-cancelled order is
/// Cancel.
pub fn aggregate_status(current: OrderStatus, items: &[OrderItem]) -> OrderStatus {
    let mut any_deliver = false;
    for item in items {
        match item.status {
            OrderStatus::Pending => return current,
            OrderStatus::Deliver => any_deliver = true,
            OrderStatus::Cancel => {}
        }
    }
    if any_deliver {
        OrderStatus::Deliver
    } else {
        OrderStatus::Cancel
    }
}
