use serde::{Deserialize, Serialize};

use super::order::{monotonic_nanos, OrderId, Price, Qty};

/// A fill between a resting maker order and the incoming taker order.
///
/// The trade executes at the maker's price regardless of how aggressive
/// the taker's limit was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub price: Price,
    pub quantity: Qty,
    pub executed_at: u64,
}

impl Trade {
    pub fn new(
        maker_order_id: OrderId,
        taker_order_id: OrderId,
        price: Price,
        quantity: Qty,
    ) -> Self {
        Self {
            maker_order_id,
            taker_order_id,
            price,
            quantity,
            executed_at: monotonic_nanos(),
        }
    }

    pub fn notional(&self) -> i64 {
        self.price * self.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notional() {
        let trade = Trade::new(1, 2, 101, 30);
        assert_eq!(trade.notional(), 3030);
    }
}
