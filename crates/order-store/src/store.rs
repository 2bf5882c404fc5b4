use std::num::NonZeroU32;

use async_trait::async_trait;

use crate::{
    AggregateRow, CustomerId, OrderDocument, OrderId, Page, PageRequest, Result, SumAggregation,
};

/// Core trait for order document stores.
///
/// Implementations are cheap-to-clone handles that are constructed once at
/// startup and passed to whoever needs them. All implementations must be
/// thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Writes a document, replacing any existing document with the same order ID.
    ///
    /// The write is atomic per document: concurrent saves of the same order ID
    /// leave one complete document, whichever landed last.
    async fn save(&self, order: OrderDocument) -> Result<()>;

    /// Writes a document only if no document with its order ID exists.
    ///
    /// Returns the existing document when the write was skipped.
    async fn insert_if_absent(&self, order: OrderDocument) -> Result<Option<OrderDocument>>;

    /// Loads a single document.
    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<OrderDocument>>;

    /// Returns one page of a customer's documents.
    ///
    /// Documents are ordered by order ID so repeated calls against the same
    /// data return the same windows. Pages past the end are empty but still
    /// carry the correct totals.
    async fn find_page(
        &self,
        customer_id: CustomerId,
        request: PageRequest,
    ) -> Result<Page<OrderDocument>>;

    /// Runs a grouped sum inside the store.
    ///
    /// Returns one row per group. No rows means nothing matched the filter.
    async fn aggregate(&self, aggregation: &SumAggregation) -> Result<Vec<AggregateRow>>;

    /// Removes a document. Returns whether one was removed.
    async fn delete(&self, order_id: OrderId) -> Result<bool>;

    /// Returns the number of stored documents.
    async fn count(&self) -> Result<u64>;
}

/// Extension trait providing convenience methods for order stores.
#[async_trait]
pub trait OrderStoreExt: OrderStore {
    /// Checks if a document exists.
    async fn exists(&self, order_id: OrderId) -> Result<bool> {
        Ok(self.find_by_id(order_id).await?.is_some())
    }

    /// Loads every document of a customer by walking the pages.
    ///
    /// Meant for administration and verification; regular reads should page.
    async fn find_all_by_customer(&self, customer_id: CustomerId) -> Result<Vec<OrderDocument>> {
        const BATCH: NonZeroU32 = match NonZeroU32::new(100) {
            Some(size) => size,
            None => NonZeroU32::MIN,
        };

        let mut orders = Vec::new();
        let mut page_number = 0;
        loop {
            let page = self
                .find_page(customer_id, PageRequest::with_size(page_number, BATCH))
                .await?;
            let last = u64::from(page_number) + 1 >= page.total_pages;
            orders.extend(page.items);
            if last {
                break;
            }
            page_number += 1;
        }
        Ok(orders)
    }
}

// Blanket implementation for all OrderStore implementations
impl<T: OrderStore + ?Sized> OrderStoreExt for T {}
