//! Order service: saving orders and the per-customer read queries.

use std::time::Instant;

use common::{CustomerId, OrderId, Page, PageRequest};
use order_store::{LineItem, OrderDocument, OrderStore, SumAggregation};
use rust_decimal::Decimal;

use crate::calculator::order_total;
use crate::error::DomainError;

use super::{
    CustomerOrderSummary, DuplicatePolicy, Order, OrderCreated, OrderError, total_from_rows,
};

/// Service for recording orders and answering per-customer questions.
///
/// Stateless between calls. All mutable state lives in the store.
pub struct OrderService<S: OrderStore> {
    store: S,
    policy: DuplicatePolicy,
}

impl<S: OrderStore> OrderService<S> {
    /// Creates a new order service with the default duplicate policy.
    pub fn new(store: S) -> Self {
        Self::with_policy(store, DuplicatePolicy::default())
    }

    /// Creates a new order service with the given duplicate policy.
    pub fn with_policy(store: S, policy: DuplicatePolicy) -> Self {
        Self { store, policy }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the duplicate policy this service was built with.
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Computes the total and persists the order.
    ///
    /// Saving the same order twice leaves one document. What happens when the
    /// second save differs depends on the [`DuplicatePolicy`].
    #[tracing::instrument(skip(self, items), fields(items = items.len()))]
    pub async fn save_order(
        &self,
        order_id: OrderId,
        customer_id: CustomerId,
        items: Vec<LineItem>,
    ) -> Result<Order, DomainError> {
        if let Some(item) = items.iter().find(|i| i.unit_price < Decimal::ZERO) {
            return Err(OrderError::InvalidPrice {
                product: item.name.clone(),
                price: item.unit_price,
            }
            .into());
        }

        let total = order_total(&items)?;
        let order = OrderDocument::new(order_id, customer_id, items, total);

        match self.policy {
            DuplicatePolicy::Overwrite => {
                self.store.save(order.clone()).await?;
            }
            DuplicatePolicy::RejectConflict => {
                if let Some(existing) = self.store.insert_if_absent(order.clone()).await? {
                    if existing != order {
                        metrics::counter!("order_conflicts_total").increment(1);
                        tracing::warn!(%order_id, "order already stored with different content");
                        return Err(OrderError::Conflict { order_id }.into());
                    }
                    tracing::debug!(%order_id, "identical redelivery ignored");
                    return Ok(existing);
                }
            }
        }

        metrics::counter!("orders_saved_total").increment(1);
        tracing::info!(%order_id, %customer_id, %total, "order saved");
        Ok(order)
    }

    /// Validates a notification and saves the order it describes.
    #[tracing::instrument(skip(self, event), fields(order_id = %event.order_id))]
    pub async fn handle_order_created(&self, event: OrderCreated) -> Result<Order, DomainError> {
        let items = event.line_items()?;
        self.save_order(event.order_id, event.customer_id, items).await
    }

    /// Returns one page of a customer's orders, ordered by order ID.
    ///
    /// A page past the end is empty but still reports the totals.
    #[tracing::instrument(skip(self))]
    pub async fn find_orders_by_customer(
        &self,
        customer_id: CustomerId,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Order>, DomainError> {
        let request = PageRequest::new(page, page_size)?;
        Ok(self.store.find_page(customer_id, request).await?)
    }

    /// Sums the totals of every order the customer has.
    ///
    /// Zero when the customer has no orders. An aggregation result that
    /// cannot be read is an error, never zero.
    #[tracing::instrument(skip(self))]
    pub async fn sum_order_totals_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Decimal, DomainError> {
        let aggregation = SumAggregation::total_by_customer(customer_id);

        let start = Instant::now();
        let rows = self.store.aggregate(&aggregation).await?;
        metrics::histogram!("order_aggregation_duration_seconds")
            .record(start.elapsed().as_secs_f64());

        let total = total_from_rows(&rows, aggregation.output_field).inspect_err(|e| {
            tracing::error!(%customer_id, error = %e, "unreadable aggregation result");
        })?;
        Ok(total)
    }

    /// Returns the customer's current cumulative total.
    pub async fn customer_summary(
        &self,
        customer_id: CustomerId,
    ) -> Result<CustomerOrderSummary, DomainError> {
        let total_across_orders = self.sum_order_totals_by_customer(customer_id).await?;
        Ok(CustomerOrderSummary {
            customer_id,
            total_across_orders,
        })
    }

    /// Looks up a single order.
    #[tracing::instrument(skip(self))]
    pub async fn find_order(&self, order_id: OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.store.find_by_id(order_id).await?)
    }
}
