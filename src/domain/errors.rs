use thiserror::Error;
use uuid::Uuid;

use super::order::OrderStatus;

/// Errors raised by the lifecycle engine. Each variant carries the offending
/// identifiers so the HTTP layer can produce a caller-facing message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("user {0} not found")]
    UserNotFound(Uuid),

    #[error("order {0} not found")]
    OrderNotFound(Uuid),

    #[error("order item {0} not found")]
    OrderItemNotFound(Uuid),

    #[error("product {0} not found")]
    ProductNotFound(Uuid),

    #[error("an order needs at least one item")]
    EmptyOrder,

    #[error("user {user_id} has no credit left ({credit})")]
    CreditExhausted { user_id: Uuid, credit: i64 },

    #[error("invalid credit amount: {0}")]
    InvalidCredit(i64),

    #[error("invalid status {status} for order item {item_id}")]
    InvalidItemStatus { item_id: Uuid, status: OrderStatus },

    #[error("a user named {first_name} {last_name} already exists in section {section}")]
    DuplicateUser {
        first_name: String,
        last_name: String,
        section: String,
    },

    #[error("operation requires an admin actor")]
    Forbidden,

    #[error("internal error: {0}")]
    Internal(String),
}
