//! Shared types for the order ledger workspace.
//!
//! - [`OrderId`] and [`CustomerId`] identifier newtypes
//! - [`PageRequest`] and [`Page`] for offset-addressed listings

pub mod page;
pub mod types;

pub use page::{InvalidPageRequest, Page, PageRequest};
pub use types::{CustomerId, OrderId};
