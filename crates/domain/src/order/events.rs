//! The order-created notification.

use common::{CustomerId, OrderId};
use order_store::LineItem;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::OrderError;

/// Published upstream whenever an order is placed.
///
/// Field names follow the camelCase wire format. The legacy Portuguese names
/// (`codigoPedido`, `codigoCliente`, `itens`) are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    #[serde(alias = "codigoPedido")]
    pub order_id: OrderId,

    #[serde(alias = "codigoCliente")]
    pub customer_id: CustomerId,

    #[serde(alias = "itens", default)]
    pub items: Vec<OrderCreatedItem>,
}

/// One line of an [`OrderCreated`] notification, as received.
///
/// Quantity and price are taken as sent; [`OrderCreated::line_items`] rejects
/// negative values before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedItem {
    #[serde(alias = "produto")]
    pub product_name: String,

    #[serde(alias = "quantidade")]
    pub quantity: i32,

    #[serde(alias = "preco")]
    pub unit_price: Decimal,
}

impl OrderCreatedItem {
    /// Creates a notification line.
    pub fn new(product_name: impl Into<String>, quantity: i32, unit_price: Decimal) -> Self {
        Self {
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }

    /// Converts to a stored line item, rejecting negative quantity or price.
    pub fn to_line_item(&self) -> Result<LineItem, OrderError> {
        let quantity =
            u32::try_from(self.quantity).map_err(|_| OrderError::InvalidQuantity {
                product: self.product_name.clone(),
                quantity: self.quantity,
            })?;
        if self.unit_price < Decimal::ZERO {
            return Err(OrderError::InvalidPrice {
                product: self.product_name.clone(),
                price: self.unit_price,
            });
        }
        Ok(LineItem::new(
            self.product_name.clone(),
            quantity,
            self.unit_price,
        ))
    }
}

impl OrderCreated {
    /// Creates a notification.
    pub fn new(
        order_id: OrderId,
        customer_id: CustomerId,
        items: Vec<OrderCreatedItem>,
    ) -> Self {
        Self {
            order_id,
            customer_id,
            items,
        }
    }

    /// Parses a notification from its JSON wire form.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Validated line items, in the order they were sent.
    pub fn line_items(&self) -> Result<Vec<LineItem>, OrderError> {
        self.items.iter().map(OrderCreatedItem::to_line_item).collect()
    }
}
