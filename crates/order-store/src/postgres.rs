use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    AggregateRow, CustomerId, LineItem, OrderDocument, OrderId, OrderStoreError, Page,
    PageRequest, Result, SumAggregation, store::OrderStore,
};

/// PostgreSQL-backed order store implementation.
///
/// Each order is one row; its line items live in a JSONB column so the order
/// is read and written as a single document.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and creates a store on the new pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_order(row: PgRow) -> Result<OrderDocument> {
        let items: Value = row.try_get("items")?;
        let items: Vec<LineItem> = serde_json::from_value(items)?;

        Ok(OrderDocument {
            order_id: OrderId::new(row.try_get("order_id")?),
            customer_id: CustomerId::new(row.try_get("customer_id")?),
            items,
            total: row.try_get("total")?,
        })
    }

    fn row_to_aggregate(row: PgRow, aggregation: &SumAggregation) -> Result<AggregateRow> {
        let key: i64 = row
            .try_get("group_key")
            .map_err(|e| OrderStoreError::AggregationShape(format!("group key: {e}")))?;
        // SUM over NUMERIC is always NUMERIC, so a decode failure means the
        // value is outside the decimal range.
        let sum: Option<Decimal> = row.try_get("sum_value").map_err(|e| match e {
            sqlx::Error::ColumnDecode { .. } => OrderStoreError::SumOverflow { group: key },
            e => OrderStoreError::AggregationShape(format!("{}: {e}", aggregation.output_field)),
        })?;

        let value = match sum {
            Some(sum) => Value::String(sum.to_string()),
            None => Value::Null,
        };
        Ok(AggregateRow::new(key).with_field(aggregation.output_field, value))
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[tracing::instrument(skip(self, order), fields(order_id = %order.order_id))]
    async fn save(&self, order: OrderDocument) -> Result<()> {
        let items = serde_json::to_value(&order.items)?;

        sqlx::query(
            r#"
            INSERT INTO orders (order_id, customer_id, items, total)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (order_id) DO UPDATE SET
                customer_id = EXCLUDED.customer_id,
                items = EXCLUDED.items,
                total = EXCLUDED.total
            "#,
        )
        .bind(order.order_id.as_i64())
        .bind(order.customer_id.as_i64())
        .bind(items)
        .bind(order.total)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self, order), fields(order_id = %order.order_id))]
    async fn insert_if_absent(&self, order: OrderDocument) -> Result<Option<OrderDocument>> {
        let items = serde_json::to_value(&order.items)?;

        let inserted: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO orders (order_id, customer_id, items, total)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (order_id) DO NOTHING
            RETURNING order_id
            "#,
        )
        .bind(order.order_id.as_i64())
        .bind(order.customer_id.as_i64())
        .bind(items)
        .bind(order.total)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(_) => Ok(None),
            None => self.find_by_id(order.order_id).await,
        }
    }

    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<OrderDocument>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT order_id, customer_id, items, total
            FROM orders
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn find_page(
        &self,
        customer_id: CustomerId,
        request: PageRequest,
    ) -> Result<Page<OrderDocument>> {
        let total_elements: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE customer_id = $1")
                .bind(customer_id.as_i64())
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query(
            r#"
            SELECT order_id, customer_id, items, total
            FROM orders
            WHERE customer_id = $1
            ORDER BY order_id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(customer_id.as_i64())
        .bind(i64::try_from(request.limit()).unwrap_or(i64::MAX))
        .bind(i64::try_from(request.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(Self::row_to_order)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(
            items,
            request,
            u64::try_from(total_elements).unwrap_or(0),
        ))
    }

    #[tracing::instrument(skip(self))]
    async fn aggregate(&self, aggregation: &SumAggregation) -> Result<Vec<AggregateRow>> {
        // Field names come from closed enums, never from input.
        let sql = format!(
            "SELECT {key} AS group_key, SUM({sum}) AS sum_value \
             FROM orders \
             WHERE ($1::BIGINT IS NULL OR customer_id = $1) \
             GROUP BY {key} \
             ORDER BY {key} ASC",
            key = aggregation.group_key.field(),
            sum = aggregation.sum_field.field(),
        );

        let rows = sqlx::query(&sql)
            .bind(aggregation.filter.customer_id.map(|id| id.as_i64()))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| Self::row_to_aggregate(row, aggregation))
            .collect()
    }

    async fn delete(&self, order_id: OrderId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE order_id = $1")
            .bind(order_id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}
