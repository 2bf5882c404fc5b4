//! Server-side aggregation over order documents.
//!
//! A [`SumAggregation`] describes "match, then group, then sum" without tying
//! it to any query language. Each store translates it into whatever its
//! engine runs natively and answers with loosely-typed [`AggregateRow`]s,
//! the way a document database hands back aggregation output.

use serde_json::{Map, Value};

use crate::CustomerId;

/// Documents considered by an aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationFilter {
    /// Only documents belonging to this customer.
    pub customer_id: Option<CustomerId>,
}

impl AggregationFilter {
    /// Matches documents of one customer.
    pub fn customer(customer_id: CustomerId) -> Self {
        Self {
            customer_id: Some(customer_id),
        }
    }
}

/// Key documents are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    CustomerId,
}

impl GroupKey {
    /// Column / field name of the key.
    pub fn field(&self) -> &'static str {
        match self {
            GroupKey::CustomerId => "customer_id",
        }
    }
}

/// Numeric field summed within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SumField {
    Total,
}

impl SumField {
    /// Column / field name of the summed value.
    pub fn field(&self) -> &'static str {
        match self {
            SumField::Total => "total",
        }
    }
}

/// A grouped sum executed by the store's query engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumAggregation {
    pub filter: AggregationFilter,
    pub group_key: GroupKey,
    pub sum_field: SumField,
    /// Name of the output field carrying the sum in each row.
    pub output_field: &'static str,
}

impl SumAggregation {
    /// Sum of order totals for one customer, grouped by customer.
    pub fn total_by_customer(customer_id: CustomerId) -> Self {
        Self {
            filter: AggregationFilter::customer(customer_id),
            group_key: GroupKey::CustomerId,
            sum_field: SumField::Total,
            output_field: "total",
        }
    }
}

/// One output row of an aggregation: the group key plus named result fields.
///
/// Values are kept as raw JSON. Sums are carried as decimal strings so no
/// precision is lost between the store and the reader.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub key: Value,
    pub fields: Map<String, Value>,
}

impl AggregateRow {
    /// Creates a row with no fields.
    pub fn new(key: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            fields: Map::new(),
        }
    }

    /// Adds a field to the row.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Looks up a result field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_by_customer_matches_one_customer() {
        let aggregation = SumAggregation::total_by_customer(CustomerId::new(42));

        assert_eq!(aggregation.filter.customer_id, Some(CustomerId::new(42)));
        assert_eq!(aggregation.group_key.field(), "customer_id");
        assert_eq!(aggregation.sum_field.field(), "total");
        assert_eq!(aggregation.output_field, "total");
    }

    #[test]
    fn row_builder_chain() {
        let row = AggregateRow::new(42).with_field("total", "35.00");

        assert_eq!(row.key, Value::from(42));
        assert_eq!(row.get("total"), Some(&Value::from("35.00")));
        assert!(row.get("count").is_none());
    }
}
