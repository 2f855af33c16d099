use crate::engine::entry::{monotonic_nanos, Order, OrderId, OrderSide, OrderStatus, Price};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::io::Write;

/// Resting-order storage for a single instrument.
///
/// Both ladders are keyed by price; the best bid is the last key and the
/// best ask is the first. Each level holds its orders in arrival order.
/// `id_index` names the (side, price) queue holding every resting order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderBook {
    pub bids: BTreeMap<Price, VecDeque<Order>>, // price -> resting orders, FIFO
    pub asks: BTreeMap<Price, VecDeque<Order>>,
    pub id_index: HashMap<OrderId, (OrderSide, Price)>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            id_index: HashMap::new(),
        }
    }

    /// Enqueue a resting order at the tail of its price level.
    pub fn add_order(&mut self, order: Order) {
        let levels = match order.side {
            OrderSide::Buy => &mut self.bids,
            OrderSide::Sell => &mut self.asks,
        };
        self.id_index.insert(order.id, (order.side, order.price));
        levels.entry(order.price).or_default().push_back(order);
    }

    /// Remove a resting order by id, erasing its level if that empties it.
    ///
    /// Returns the removed order marked `Canceled`, or `None` when the id is
    /// not resting.
    pub fn remove_order(&mut self, order_id: OrderId) -> Option<Order> {
        let (side, price) = *self.id_index.get(&order_id)?;
        let levels = match side {
            OrderSide::Buy => &mut self.bids,
            OrderSide::Sell => &mut self.asks,
        };
        let queue = levels.get_mut(&price)?;
        let pos = queue.iter().position(|o| o.id == order_id)?;
        let mut order = queue.remove(pos)?;
        if queue.is_empty() {
            levels.remove(&price);
        }
        self.id_index.remove(&order_id);
        order.status = OrderStatus::Canceled;
        order.updated_at = monotonic_nanos();
        Some(order)
    }

    pub fn get_best_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().copied()
    }

    pub fn get_best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    pub fn get_spread(&self) -> Option<Price> {
        match (self.get_best_ask(), self.get_best_bid()) {
            (Some(ask), Some(bid)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Diagnostic dump: asks low to high, bids high to low.
    pub fn print_book<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "===== ORDER BOOK =====")?;
        writeln!(out, " Asks (low -> high)")?;
        for (price, queue) in &self.asks {
            write!(out, "  {} : ", price)?;
            for order in queue {
                write!(out, "{} x {} ", order.id, order.remaining_quantity())?;
            }
            writeln!(out)?;
        }
        writeln!(out, " Bids (high -> low)")?;
        for (price, queue) in self.bids.iter().rev() {
            write!(out, "  {} : ", price)?;
            for order in queue {
                write!(out, "{} x {} ", order.id, order.remaining_quantity())?;
            }
            writeln!(out)?;
        }
        writeln!(out, "======================")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resting(id: OrderId, side: OrderSide, price: Price, qty: i64) -> Order {
        Order::new(id, side, price, qty)
    }

    #[test]
    fn test_empty_book() {
        let book = OrderBook::new();
        assert_eq!(book.get_best_bid(), None);
        assert_eq!(book.get_best_ask(), None);
        assert_eq!(book.get_spread(), None);
    }

    #[test]
    fn test_best_bid_is_highest() {
        let mut book = OrderBook::new();
        book.add_order(resting(1, OrderSide::Buy, 100, 10));
        book.add_order(resting(2, OrderSide::Buy, 102, 10));
        book.add_order(resting(3, OrderSide::Buy, 99, 10));
        assert_eq!(book.get_best_bid(), Some(102));
    }

    #[test]
    fn test_best_ask_is_lowest() {
        let mut book = OrderBook::new();
        book.add_order(resting(1, OrderSide::Sell, 105, 10));
        book.add_order(resting(2, OrderSide::Sell, 103, 10));
        book.add_order(resting(3, OrderSide::Sell, 104, 10));
        assert_eq!(book.get_best_ask(), Some(103));
    }

    #[test]
    fn test_spread() {
        let mut book = OrderBook::new();
        book.add_order(resting(1, OrderSide::Buy, 100, 10));
        book.add_order(resting(2, OrderSide::Sell, 103, 10));
        assert_eq!(book.get_spread(), Some(3));
    }

    #[test]
    fn test_fifo_within_level() {
        let mut book = OrderBook::new();
        book.add_order(resting(1, OrderSide::Buy, 100, 10));
        book.add_order(resting(2, OrderSide::Buy, 100, 20));
        let queue = book.bids.get(&100).unwrap();
        let ids: Vec<OrderId> = queue.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_remove_order_updates_index_and_level() {
        let mut book = OrderBook::new();
        book.add_order(resting(1, OrderSide::Buy, 100, 10));
        book.add_order(resting(2, OrderSide::Buy, 100, 20));

        let removed = book.remove_order(1).unwrap();
        assert_eq!(removed.id, 1);
        assert_eq!(removed.status, OrderStatus::Canceled);
        assert!(!book.id_index.contains_key(&1));
        assert_eq!(book.bids.get(&100).unwrap().len(), 1);

        let removed = book.remove_order(2).unwrap();
        assert_eq!(removed.id, 2);
        assert!(book.bids.is_empty());
        assert!(book.id_index.is_empty());
    }

    #[test]
    fn test_remove_unknown_order() {
        let mut book = OrderBook::new();
        assert!(book.remove_order(42).is_none());
    }

    #[test]
    fn test_index_matches_resting_orders() {
        let mut book = OrderBook::new();
        book.add_order(resting(1, OrderSide::Buy, 100, 10));
        book.add_order(resting(2, OrderSide::Sell, 103, 10));
        book.add_order(resting(3, OrderSide::Sell, 103, 5));

        for (id, (side, price)) in &book.id_index {
            let levels = match side {
                OrderSide::Buy => &book.bids,
                OrderSide::Sell => &book.asks,
            };
            let queue = levels.get(price).unwrap();
            assert_eq!(queue.iter().filter(|o| o.id == *id).count(), 1);
        }
        let resting_count: usize =
            book.bids.values().map(|q| q.len()).sum::<usize>()
                + book.asks.values().map(|q| q.len()).sum::<usize>();
        assert_eq!(resting_count, book.id_index.len());
    }

    #[test]
    fn test_print_book_lists_both_sides() {
        let mut book = OrderBook::new();
        book.add_order(resting(1, OrderSide::Buy, 100, 10));
        book.add_order(resting(2, OrderSide::Sell, 103, 5));
        let mut out = Vec::new();
        book.print_book(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Asks"));
        assert!(text.contains("Bids"));
        assert!(text.contains("2 x 5"));
        assert!(text.contains("1 x 10"));
    }
}
