use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CustomerId, OrderId};

/// One product line within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product name.
    pub name: String,

    /// Units ordered.
    pub quantity: u32,

    /// Price per unit.
    pub unit_price: Decimal,
}

impl LineItem {
    /// Creates a new line item.
    pub fn new(name: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns `quantity * unit_price`.
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A persisted order: its items and the total computed when it was created.
///
/// The store keeps whatever total it is handed. Computing it is the caller's
/// job, and readers never re-derive it from the items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDocument {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub items: Vec<LineItem>,
    pub total: Decimal,
}

impl OrderDocument {
    /// Creates a new order document.
    pub fn new(
        order_id: OrderId,
        customer_id: CustomerId,
        items: Vec<LineItem>,
        total: Decimal,
    ) -> Self {
        Self {
            order_id,
            customer_id,
            items,
            total,
        }
    }
}
