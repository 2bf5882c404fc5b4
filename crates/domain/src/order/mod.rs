//! Orders: the created notification, the service and its duplicate policy.

mod events;
mod policy;
mod service;
mod summary;

pub use events::{OrderCreated, OrderCreatedItem};
pub use policy::{DuplicatePolicy, UnknownDuplicatePolicy};
pub use service::OrderService;
pub use summary::{CustomerOrderSummary, total_from_rows};

use common::OrderId;
use rust_decimal::Decimal;
use thiserror::Error;

/// A persisted order.
pub type Order = order_store::OrderDocument;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Invalid quantity.
    #[error("Invalid quantity for {product}: {quantity} (must not be negative)")]
    InvalidQuantity { product: String, quantity: i32 },

    /// Invalid price.
    #[error("Invalid price for {product}: {price} (must not be negative)")]
    InvalidPrice { product: String, price: Decimal },

    /// The order total does not fit in a decimal.
    #[error("Order total overflows")]
    TotalOverflow,

    /// The order ID is already taken by a different order.
    #[error("Order {order_id} already exists with different content")]
    Conflict { order_id: OrderId },
}
