//! Reading the customer total out of an aggregation result.

use std::str::FromStr;

use common::CustomerId;
use order_store::{AggregateRow, OrderStoreError};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

/// A customer's cumulative order total. Always freshly aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerOrderSummary {
    pub customer_id: CustomerId,
    pub total_across_orders: Decimal,
}

/// Extracts a single sum from the rows of a one-group aggregation.
///
/// No rows means nothing matched, which is a genuine zero. Anything else that
/// is not exactly one row carrying a decimal in `field` is reported as
/// [`OrderStoreError::AggregationShape`] rather than read as zero.
pub fn total_from_rows(rows: &[AggregateRow], field: &str) -> Result<Decimal, OrderStoreError> {
    let row = match rows {
        [] => return Ok(Decimal::ZERO),
        [row] => row,
        _ => {
            return Err(OrderStoreError::AggregationShape(format!(
                "expected one group, got {}",
                rows.len()
            )));
        }
    };

    match row.get(field) {
        Some(Value::String(s)) => Decimal::from_str(s).map_err(|e| {
            OrderStoreError::AggregationShape(format!("{field} is not a decimal ({s:?}): {e}"))
        }),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => Ok(Decimal::from(i)),
            None => Decimal::from_str(&n.to_string())
                .or_else(|_| Decimal::from_scientific(&n.to_string()))
                .map_err(|e| {
                    OrderStoreError::AggregationShape(format!("{field} is not a decimal ({n}): {e}"))
                }),
        },
        Some(other) => Err(OrderStoreError::AggregationShape(format!(
            "{field} has unexpected type: {other}"
        ))),
        None => Err(OrderStoreError::AggregationShape(format!(
            "{field} is missing from the result"
        ))),
    }
}
