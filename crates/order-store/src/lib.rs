pub mod document;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use common::{CustomerId, OrderId, Page, PageRequest};
pub use document::{LineItem, OrderDocument};
pub use error::{OrderStoreError, Result};
pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use query::{AggregateRow, AggregationFilter, GroupKey, SumAggregation, SumField};
pub use store::{OrderStore, OrderStoreExt};
