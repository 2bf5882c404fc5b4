//! Domain layer for the order ledger.
//!
//! This crate provides:
//! - the order total calculator
//! - the order-created notification and its boundary check
//! - [`OrderService`]: saving orders and the per-customer read queries

pub mod calculator;
pub mod error;
pub mod order;

pub use calculator::{PricedLine, order_total};
pub use error::DomainError;
pub use order::{
    CustomerOrderSummary, DuplicatePolicy, Order, OrderCreated, OrderCreatedItem, OrderError,
    OrderService, UnknownDuplicatePolicy, total_from_rows,
};
