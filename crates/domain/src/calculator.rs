//! Order total calculation.

use order_store::LineItem;
use rust_decimal::Decimal;

use crate::order::{OrderCreatedItem, OrderError};

/// Anything that prices like a line item: a quantity and a unit price.
pub trait PricedLine {
    /// Units ordered.
    fn quantity(&self) -> Decimal;

    /// Price per unit.
    fn unit_price(&self) -> Decimal;
}

impl PricedLine for LineItem {
    fn quantity(&self) -> Decimal {
        Decimal::from(self.quantity)
    }

    fn unit_price(&self) -> Decimal {
        self.unit_price
    }
}

impl PricedLine for OrderCreatedItem {
    fn quantity(&self) -> Decimal {
        Decimal::from(self.quantity)
    }

    fn unit_price(&self) -> Decimal {
        self.unit_price
    }
}

/// Sums `quantity * unit_price` over `items` in exact decimal arithmetic.
///
/// An empty slice totals exactly zero. The only failure is a total too large
/// for a 96-bit decimal mantissa.
pub fn order_total<L: PricedLine>(items: &[L]) -> Result<Decimal, OrderError> {
    items.iter().try_fold(Decimal::ZERO, |total, item| {
        item.unit_price()
            .checked_mul(item.quantity())
            .and_then(|subtotal| total.checked_add(subtotal))
            .ok_or(OrderError::TotalOverflow)
    })
}
