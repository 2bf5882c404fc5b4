//! Domain error types.

use common::InvalidPageRequest;
use order_store::OrderStoreError;
use thiserror::Error;

use crate::order::OrderError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the order store.
    #[error("Order store error: {0}")]
    Store(#[from] OrderStoreError),

    /// The order itself was rejected.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Pagination parameters were out of range.
    #[error(transparent)]
    InvalidPageRequest(#[from] InvalidPageRequest),
}

impl DomainError {
    /// Returns true if the store answered an aggregation with an unexpected result.
    pub fn is_aggregation_shape(&self) -> bool {
        matches!(self, DomainError::Store(OrderStoreError::AggregationShape(_)))
    }
}
