//! Channel-fed listener for order-created notifications.

use std::sync::Arc;

use domain::{Order, OrderCreated, OrderService};
use order_store::OrderStore;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::ListenerError;

/// Builds the sender/receiver pair carrying raw notification messages.
pub fn channel(capacity: usize) -> (mpsc::Sender<Vec<u8>>, mpsc::Receiver<Vec<u8>>) {
    mpsc::channel(capacity)
}

/// What became of a single message.
#[derive(Debug)]
pub enum MessageOutcome {
    /// The order was recorded.
    Saved(Order),

    /// The message can never be recorded and was skipped.
    Rejected(ListenerError),

    /// The store failed. Redelivery may succeed.
    Failed(ListenerError),
}

impl MessageOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, MessageOutcome::Saved(_))
    }
}

/// Counts of messages handled by one [`OrderCreatedListener::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
    pub received: u64,
    pub saved: u64,
    pub rejected: u64,
    pub failed: u64,
}

impl ListenerStats {
    fn record(&mut self, outcome: &MessageOutcome) {
        self.received += 1;
        match outcome {
            MessageOutcome::Saved(_) => self.saved += 1,
            MessageOutcome::Rejected(_) => self.rejected += 1,
            MessageOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Decodes order-created notifications and records them.
///
/// One message is handled at a time. A bad message never stops the listener:
/// it is logged, counted and skipped. Redelivery is the transport's concern.
pub struct OrderCreatedListener<S: OrderStore> {
    service: Arc<OrderService<S>>,
    receiver: mpsc::Receiver<Vec<u8>>,
}

impl<S: OrderStore + 'static> OrderCreatedListener<S> {
    /// Creates a listener draining `receiver` into `service`.
    pub fn new(service: Arc<OrderService<S>>, receiver: mpsc::Receiver<Vec<u8>>) -> Self {
        Self { service, receiver }
    }

    /// Handles one raw message.
    #[tracing::instrument(skip(self, message), fields(bytes = message.len()))]
    pub async fn handle_message(&self, message: &[u8]) -> MessageOutcome {
        let result = match OrderCreated::from_json(message) {
            Ok(event) => self
                .service
                .handle_order_created(event)
                .await
                .map_err(ListenerError::from),
            Err(e) => Err(ListenerError::from(e)),
        };

        match result {
            Ok(order) => MessageOutcome::Saved(order),
            Err(e) if e.is_rejection() => {
                metrics::counter!("listener_messages_rejected").increment(1);
                tracing::warn!(error = %e, "order-created message rejected");
                MessageOutcome::Rejected(e)
            }
            Err(e) => {
                metrics::counter!("listener_messages_failed").increment(1);
                tracing::error!(error = %e, "failed to record order-created message");
                MessageOutcome::Failed(e)
            }
        }
    }

    /// Drains the channel until every sender is dropped.
    #[tracing::instrument(skip(self))]
    pub async fn run(mut self) -> ListenerStats {
        let mut stats = ListenerStats::default();

        while let Some(message) = self.receiver.recv().await {
            metrics::counter!("listener_messages_received").increment(1);
            let outcome = self.handle_message(&message).await;
            stats.record(&outcome);
        }

        tracing::info!(
            received = stats.received,
            saved = stats.saved,
            rejected = stats.rejected,
            failed = stats.failed,
            "order-created listener stopped"
        );
        stats
    }

    /// Runs the listener on the tokio runtime.
    pub fn spawn(self) -> JoinHandle<ListenerStats> {
        tokio::spawn(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{CustomerId, OrderId};
    use order_store::{InMemoryOrderStore, OrderStoreExt};
    use rust_decimal::Decimal;

    fn listener() -> (
        mpsc::Sender<Vec<u8>>,
        OrderCreatedListener<InMemoryOrderStore>,
        Arc<OrderService<InMemoryOrderStore>>,
    ) {
        let service = Arc::new(OrderService::new(InMemoryOrderStore::new()));
        let (tx, rx) = channel(16);
        (tx, OrderCreatedListener::new(service.clone(), rx), service)
    }

    #[tokio::test]
    async fn test_valid_message_is_saved() {
        let (_tx, listener, service) = listener();

        let outcome = listener
            .handle_message(
                br#"{"orderId": 1, "customerId": 42, "items": [
                    {"productName": "widget", "quantity": 2, "unitPrice": "10.00"}
                ]}"#,
            )
            .await;

        assert!(outcome.is_saved());
        let stored = service.find_order(OrderId::new(1)).await.unwrap().unwrap();
        assert_eq!(stored.total, Decimal::new(2000, 2));
    }

    #[tokio::test]
    async fn test_malformed_message_is_rejected() {
        let (_tx, listener, service) = listener();

        let outcome = listener.handle_message(b"{ not json").await;

        assert!(matches!(
            outcome,
            MessageOutcome::Rejected(ListenerError::Decode(_))
        ));
        assert_eq!(service.store().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_negative_quantity_is_rejected() {
        let (_tx, listener, service) = listener();

        let outcome = listener
            .handle_message(
                br#"{"orderId": 1, "customerId": 42, "items": [
                    {"productName": "widget", "quantity": -1, "unitPrice": "10.00"}
                ]}"#,
            )
            .await;

        assert!(matches!(
            outcome,
            MessageOutcome::Rejected(ListenerError::Domain(_))
        ));
        assert!(!service.store().exists(OrderId::new(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_run_drains_until_closed() {
        let (tx, listener, service) = listener();
        let handle = listener.spawn();

        tx.send(br#"{"orderId": 1, "customerId": 42, "items": []}"#.to_vec())
            .await
            .unwrap();
        tx.send(b"garbage".to_vec()).await.unwrap();
        tx.send(
            br#"{"codigoPedido": 2, "codigoCliente": 42, "itens": [
                {"produto": "gear", "quantidade": 3, "preco": 1.50}
            ]}"#
            .to_vec(),
        )
        .await
        .unwrap();
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

        let sum = service
            .sum_order_totals_by_customer(CustomerId::new(42))
            .await
            .unwrap();
        assert_eq!(sum, Decimal::new(450, 2));
    }
}
