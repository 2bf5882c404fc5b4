use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{
    AggregateRow, CustomerId, GroupKey, OrderDocument, OrderId, OrderStoreError, Page,
    PageRequest, Result, SumAggregation, SumField, store::OrderStore,
};

/// In-memory order store implementation for testing and local runs.
///
/// Documents are kept in order ID order, which is the natural retrieval
/// order of this store. It provides the same interface as the PostgreSQL
/// implementation.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<BTreeMap<OrderId, OrderDocument>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all documents.
    pub async fn clear(&self) {
        self.orders.write().await.clear();
    }
}

fn group_key(order: &OrderDocument, key: GroupKey) -> i64 {
    match key {
        GroupKey::CustomerId => order.customer_id.as_i64(),
    }
}

fn sum_value(order: &OrderDocument, field: SumField) -> Decimal {
    match field {
        SumField::Total => order.total,
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn save(&self, order: OrderDocument) -> Result<()> {
        self.orders.write().await.insert(order.order_id, order);
        Ok(())
    }

    async fn insert_if_absent(&self, order: OrderDocument) -> Result<Option<OrderDocument>> {
        let mut orders = self.orders.write().await;
        if let Some(existing) = orders.get(&order.order_id) {
            return Ok(Some(existing.clone()));
        }
        orders.insert(order.order_id, order);
        Ok(None)
    }

    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<OrderDocument>> {
        Ok(self.orders.read().await.get(&order_id).cloned())
    }

    async fn find_page(
        &self,
        customer_id: CustomerId,
        request: PageRequest,
    ) -> Result<Page<OrderDocument>> {
        let orders = self.orders.read().await;
        let matching: Vec<_> = orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .collect();

        let total_elements = matching.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(request.limit()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(Page::new(items, request, total_elements))
    }

    async fn aggregate(&self, aggregation: &SumAggregation) -> Result<Vec<AggregateRow>> {
        let orders = self.orders.read().await;

        let mut groups: BTreeMap<i64, Decimal> = BTreeMap::new();
        for order in orders.values() {
            if let Some(customer_id) = aggregation.filter.customer_id
                && order.customer_id != customer_id
            {
                continue;
            }
            let group = group_key(order, aggregation.group_key);
            let sum = groups.entry(group).or_default();
            *sum = sum
                .checked_add(sum_value(order, aggregation.sum_field))
                .ok_or(OrderStoreError::SumOverflow { group })?;
        }

        Ok(groups
            .into_iter()
            .map(|(key, sum)| {
                AggregateRow::new(key)
                    .with_field(aggregation.output_field, Value::String(sum.to_string()))
            })
            .collect())
    }

    async fn delete(&self, order_id: OrderId) -> Result<bool> {
        Ok(self.orders.write().await.remove(&order_id).is_some())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.orders.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LineItem;
    use crate::store::OrderStoreExt;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn create_test_order(order_id: i64, customer_id: i64, total: &str) -> OrderDocument {
        OrderDocument::new(
            OrderId::new(order_id),
            CustomerId::new(customer_id),
            vec![LineItem::new("widget", 1, dec(total))],
            dec(total),
        )
    }

    fn page(page: u32, size: u32) -> PageRequest {
        PageRequest::new(page, size).unwrap()
    }

    #[tokio::test]
    async fn save_and_find_by_id() {
        let store = InMemoryOrderStore::new();
        let order = create_test_order(1, 42, "25.00");

        store.save(order.clone()).await.unwrap();

        let found = store.find_by_id(OrderId::new(1)).await.unwrap();
        assert_eq!(found, Some(order));
        assert!(store.exists(OrderId::new(1)).await.unwrap());
        assert!(!store.exists(OrderId::new(2)).await.unwrap());
    }

    #[tokio::test]
    async fn save_overwrites_same_order_id() {
        let store = InMemoryOrderStore::new();

        store.save(create_test_order(1, 42, "25.00")).await.unwrap();
        store.save(create_test_order(1, 42, "30.00")).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let found = store.find_by_id(OrderId::new(1)).await.unwrap().unwrap();
        assert_eq!(found.total, dec("30.00"));
    }

    #[tokio::test]
    async fn insert_if_absent_keeps_first_document() {
        let store = InMemoryOrderStore::new();
        let first = create_test_order(1, 42, "25.00");

        let existing = store.insert_if_absent(first.clone()).await.unwrap();
        assert!(existing.is_none());

        let existing = store
            .insert_if_absent(create_test_order(1, 42, "99.00"))
            .await
            .unwrap();
        assert_eq!(existing, Some(first.clone()));

        let stored = store.find_by_id(OrderId::new(1)).await.unwrap();
        assert_eq!(stored, Some(first));
    }

    #[tokio::test]
    async fn find_page_filters_by_customer_in_order_id_order() {
        let store = InMemoryOrderStore::new();
        store.save(create_test_order(3, 42, "1.00")).await.unwrap();
        store.save(create_test_order(1, 42, "1.00")).await.unwrap();
        store.save(create_test_order(2, 7, "1.00")).await.unwrap();

        let result = store.find_page(CustomerId::new(42), page(0, 10)).await.unwrap();

        let ids: Vec<_> = result.items.iter().map(|o| o.order_id.as_i64()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(result.total_elements, 2);
        assert_eq!(result.total_pages, 1);
    }

    #[tokio::test]
    async fn find_page_windows_results() {
        let store = InMemoryOrderStore::new();
        for id in 1..=5 {
            store.save(create_test_order(id, 42, "1.00")).await.unwrap();
        }

        let second = store.find_page(CustomerId::new(42), page(1, 2)).await.unwrap();
        let ids: Vec<_> = second.items.iter().map(|o| o.order_id.as_i64()).collect();
        assert_eq!(ids, vec![3, 4]);
        assert_eq!(second.total_elements, 5);
        assert_eq!(second.total_pages, 3);

        let last = store.find_page(CustomerId::new(42), page(2, 2)).await.unwrap();
        assert_eq!(last.items.len(), 1);
    }

    #[tokio::test]
    async fn find_page_beyond_last_is_empty_with_totals() {
        let store = InMemoryOrderStore::new();
        store.save(create_test_order(1, 42, "1.00")).await.unwrap();

        let result = store.find_page(CustomerId::new(42), page(5, 10)).await.unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total_elements, 1);
        assert_eq!(result.total_pages, 1);
    }

    #[tokio::test]
    async fn aggregate_sums_one_customer() {
        let store = InMemoryOrderStore::new();
        store.save(create_test_order(1, 42, "25.00")).await.unwrap();
        store.save(create_test_order(2, 42, "10.00")).await.unwrap();
        store.save(create_test_order(3, 7, "99.99")).await.unwrap();

        let rows = store
            .aggregate(&SumAggregation::total_by_customer(CustomerId::new(42)))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, Value::from(42));
        assert_eq!(rows[0].get("total"), Some(&Value::from("35.00")));
    }

    #[tokio::test]
    async fn aggregate_without_matches_returns_no_rows() {
        let store = InMemoryOrderStore::new();
        store.save(create_test_order(1, 42, "25.00")).await.unwrap();

        let rows = store
            .aggregate(&SumAggregation::total_by_customer(CustomerId::new(7)))
            .await
            .unwrap();

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn aggregate_reports_sum_beyond_decimal_range() {
        let store = InMemoryOrderStore::new();
        let big = Decimal::from_i128_with_scale(5 * 10_i128.pow(28), 0);
        for id in 1..=2 {
            store
                .save(OrderDocument::new(
                    OrderId::new(id),
                    CustomerId::new(42),
                    vec![LineItem::new("big", 1, big)],
                    big,
                ))
                .await
                .unwrap();
        }

        let result = store
            .aggregate(&SumAggregation::total_by_customer(CustomerId::new(42)))
            .await;

        assert!(matches!(
            result,
            Err(OrderStoreError::SumOverflow { group: 42 })
        ));
    }

    #[tokio::test]
    async fn find_all_by_customer_walks_every_page() {
        let store = InMemoryOrderStore::new();
        for id in 1..=250 {
            store.save(create_test_order(id, 42, "1.00")).await.unwrap();
        }

        let all = store.find_all_by_customer(CustomerId::new(42)).await.unwrap();
        assert_eq!(all.len(), 250);

        let none = store.find_all_by_customer(CustomerId::new(7)).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn delete_and_clear() {
        let store = InMemoryOrderStore::new();
        store.save(create_test_order(1, 42, "1.00")).await.unwrap();
        store.save(create_test_order(2, 42, "1.00")).await.unwrap();

        assert!(store.delete(OrderId::new(1)).await.unwrap());
        assert!(!store.delete(OrderId::new(1)).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);

        store.clear().await;
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
