//! Integration tests: notification channel → OrderCreatedListener → OrderService → store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::{CustomerId, OrderId, Page, PageRequest};
use domain::{DuplicatePolicy, OrderService};
use listener::{ListenerStats, MessageOutcome, OrderCreatedListener, channel};
use order_store::{
    AggregateRow, InMemoryOrderStore, OrderDocument, OrderStore, OrderStoreError, Result,
    SumAggregation,
};
use rust_decimal::Decimal;

/// Store whose writes fail while `down` is set.
struct FlakyStore {
    inner: InMemoryOrderStore,
    down: AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: InMemoryOrderStore::new(),
            down: AtomicBool::new(false),
        }
    }

    fn check(&self) -> Result<()> {
        if self.down.load(Ordering::SeqCst) {
            let cause = serde_json::from_str::<u8>("unavailable").unwrap_err();
            return Err(OrderStoreError::Serialization(cause));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for FlakyStore {
    async fn save(&self, order: OrderDocument) -> Result<()> {
        self.check()?;
        self.inner.save(order).await
    }

    async fn insert_if_absent(&self, order: OrderDocument) -> Result<Option<OrderDocument>> {
        self.check()?;
        self.inner.insert_if_absent(order).await
    }

    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<OrderDocument>> {
        self.inner.find_by_id(order_id).await
    }

    async fn find_page(
        &self,
        customer_id: CustomerId,
        request: PageRequest,
    ) -> Result<Page<OrderDocument>> {
        self.inner.find_page(customer_id, request).await
    }

    async fn aggregate(&self, aggregation: &SumAggregation) -> Result<Vec<AggregateRow>> {
        self.inner.aggregate(aggregation).await
    }

    async fn delete(&self, order_id: OrderId) -> Result<bool> {
        self.inner.delete(order_id).await
    }

    async fn count(&self) -> Result<u64> {
        self.inner.count().await
    }
}

fn message(order_id: i64, customer_id: i64, quantity: i64, price: &str) -> Vec<u8> {
    format!(
        r#"{{"orderId": {order_id}, "customerId": {customer_id}, "items": [
            {{"productName": "widget", "quantity": {quantity}, "unitPrice": "{price}"}}
        ]}}"#
    )
    .into_bytes()
}

#[tokio::test]
async fn test_listener_feeds_customer_totals() {
    let service = Arc::new(OrderService::new(InMemoryOrderStore::new()));
    let (tx, rx) = channel(8);
    let handle = OrderCreatedListener::new(service.clone(), rx).spawn();

    for id in 1..=20 {
        tx.send(message(id, id % 2, 1, "0.10")).await.unwrap();
    }
    // redelivery of an order already seen
    tx.send(message(1, 1, 1, "0.10")).await.unwrap();
    drop(tx);

    let stats = handle.await.unwrap();
    assert_eq!(stats.received, 21);
    assert_eq!(stats.saved, 21);

    let odd = service
        .sum_order_totals_by_customer(CustomerId::new(1))
        .await
        .unwrap();
    let even = service
        .sum_order_totals_by_customer(CustomerId::new(0))
        .await
        .unwrap();
    assert_eq!(odd, Decimal::new(100, 2));
    assert_eq!(even, Decimal::new(100, 2));
    assert_eq!(service.store().count().await.unwrap(), 20);
}

#[tokio::test]
async fn test_store_failure_is_counted_and_listener_continues() {
    let service = Arc::new(OrderService::new(FlakyStore::new()));
    let (tx, rx) = channel(8);
    let listener = OrderCreatedListener::new(service.clone(), rx);

    service.store().down.store(true, Ordering::SeqCst);
    let outcome = listener.handle_message(&message(1, 42, 1, "10.00")).await;
    assert!(matches!(outcome, MessageOutcome::Failed(_)));

    service.store().down.store(false, Ordering::SeqCst);
    let handle = listener.spawn();
    tx.send(message(1, 42, 1, "10.00")).await.unwrap();
    drop(tx);

    let stats = handle.await.unwrap();
    assert_eq!(stats.saved, 1);
    assert!(service.find_order(OrderId::new(1)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_conflicting_redelivery_is_rejected_under_reject_policy() {
    let service = Arc::new(OrderService::with_policy(
        InMemoryOrderStore::new(),
        DuplicatePolicy::RejectConflict,
    ));
    let (tx, rx) = channel(8);
    let handle = OrderCreatedListener::new(service.clone(), rx).spawn();

    tx.send(message(1, 42, 1, "10.00")).await.unwrap();
    tx.send(message(1, 42, 1, "10.00")).await.unwrap();
    tx.send(message(1, 42, 9, "10.00")).await.unwrap();
    drop(tx);

    let stats = handle.await.unwrap();
    assert_eq!(
        stats,
        ListenerStats {
            received: 3,
            saved: 2,
            rejected: 1,
            failed: 0,
        }
    );

    let stored = service.find_order(OrderId::new(1)).await.unwrap().unwrap();
    assert_eq!(stored.total, Decimal::new(1000, 2));
}
