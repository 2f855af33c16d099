use crate::engine::data::OrderBook;
use crate::engine::entry::{Order, OrderId, OrderSide, Price, Trade};
use serde::{Deserialize, Serialize};
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid order: {0}")]
    InvalidOrder(String),
}

/// Single-threaded matching core: crosses incoming limit orders against the
/// book under price-time priority and rests any residual.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Matcher {
    orderbook: OrderBook,
}

impl Matcher {
    pub fn new() -> Self {
        Self {
            orderbook: OrderBook::new(),
        }
    }

    /// Boundary check shared by the synchronous and asynchronous entry points.
    pub fn validate(order: &Order) -> Result<(), EngineError> {
        if order.quantity <= 0 {
            return Err(EngineError::InvalidOrder(format!(
                "order {}: quantity must be positive",
                order.id
            )));
        }
        if order.price <= 0 {
            return Err(EngineError::InvalidOrder(format!(
                "order {}: price must be positive",
                order.id
            )));
        }
        Ok(())
    }

    /// Match an incoming limit order, resting the unfilled residual.
    ///
    /// Returns the trades in execution order; the trade price is always the
    /// resting order's price.
    pub fn place_order(&mut self, mut order: Order) -> Result<Vec<Trade>, EngineError> {
        Self::validate(&order)?;

        let mut trades = Vec::new();

        while !order.is_filled() {
            let best_price = match order.side {
                OrderSide::Buy => self.orderbook.get_best_ask(),
                OrderSide::Sell => self.orderbook.get_best_bid(),
            };
            let price = match best_price {
                Some(price) => price,
                None => break,
            };
            let crossable = match order.side {
                OrderSide::Buy => order.price >= price,
                OrderSide::Sell => order.price <= price,
            };
            if !crossable {
                break;
            }

            let levels = match order.side {
                OrderSide::Buy => &mut self.orderbook.asks,
                OrderSide::Sell => &mut self.orderbook.bids,
            };
            let queue = match levels.get_mut(&price) {
                Some(queue) => queue,
                None => break,
            };
            let resting = match queue.front_mut() {
                Some(resting) => resting,
                None => break,
            };

            let traded = order.remaining_quantity().min(resting.remaining_quantity());
            trades.push(Trade::new(resting.id, order.id, resting.price, traded));
            order.filled_quantity += traded;
            resting.filled_quantity += traded;
            order.update_status();
            resting.update_status();

            if resting.is_filled() {
                let maker_id = resting.id;
                queue.pop_front();
                if queue.is_empty() {
                    levels.remove(&price);
                }
                self.orderbook.id_index.remove(&maker_id);
            }
        }

        if !order.is_filled() {
            self.orderbook.add_order(order);
        }

        Ok(trades)
    }

    /// Remove a resting order. Returns the cancelled order, `None` when the
    /// id is not resting (unknown, already filled, or already cancelled).
    pub fn cancel_order(&mut self, order_id: OrderId) -> Option<Order> {
        self.orderbook.remove_order(order_id)
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.orderbook.get_best_bid()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.orderbook.get_best_ask()
    }

    pub fn print_book<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        self.orderbook.print_book(out)
    }

    pub fn book(&self) -> &OrderBook {
        &self.orderbook
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::entry::Qty;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn buy(id: OrderId, price: Price, qty: Qty) -> Order {
        Order::new(id, OrderSide::Buy, price, qty)
    }

    fn sell(id: OrderId, price: Price, qty: Qty) -> Order {
        Order::new(id, OrderSide::Sell, price, qty)
    }

    fn resting_quantity(matcher: &Matcher) -> Qty {
        let book = matcher.book();
        book.bids
            .values()
            .chain(book.asks.values())
            .flat_map(|q| q.iter())
            .map(|o| o.remaining_quantity())
            .sum()
    }

    #[test]
    fn test_no_cross_rests_order() {
        let mut matcher = Matcher::new();
        let trades = matcher.place_order(buy(1, 100, 10)).unwrap();
        assert!(trades.is_empty());
        assert_eq!(matcher.best_bid(), Some(100));
        assert_eq!(matcher.best_ask(), None);
    }

    #[test]
    fn test_full_cross_walks_levels() {
        let mut matcher = Matcher::new();
        matcher.place_order(sell(1, 101, 50)).unwrap();
        matcher.place_order(sell(2, 102, 40)).unwrap();
        matcher.place_order(buy(3, 100, 70)).unwrap();

        let trades = matcher.place_order(buy(4, 102, 80)).unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(
            (trades[0].maker_order_id, trades[0].taker_order_id),
            (1, 4)
        );
        assert_eq!((trades[0].price, trades[0].quantity), (101, 50));
        assert_eq!(
            (trades[1].maker_order_id, trades[1].taker_order_id),
            (2, 4)
        );
        assert_eq!((trades[1].price, trades[1].quantity), (102, 30));

        assert_eq!(matcher.best_ask(), None);
        assert_eq!(matcher.best_bid(), Some(100));
        let level = matcher.book().bids.get(&100).unwrap();
        assert_eq!(level.len(), 1);
        assert_eq!(level[0].id, 3);
        assert_eq!(level[0].remaining_quantity(), 70);
    }

    #[test]
    fn test_partial_fill_leaves_maker_residual() {
        let mut matcher = Matcher::new();
        matcher.place_order(sell(1, 101, 50)).unwrap();

        let trades = matcher.place_order(buy(2, 101, 30)).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!((trades[0].price, trades[0].quantity), (101, 30));

        assert_eq!(matcher.best_bid(), None);
        let level = matcher.book().asks.get(&101).unwrap();
        assert_eq!(level[0].id, 1);
        assert_eq!(level[0].remaining_quantity(), 20);
    }

    #[test]
    fn test_taker_residual_rests_at_limit() {
        let mut matcher = Matcher::new();
        matcher.place_order(sell(1, 101, 30)).unwrap();

        let trades = matcher.place_order(buy(2, 101, 50)).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].quantity, 30);

        assert_eq!(matcher.best_ask(), None);
        assert_eq!(matcher.best_bid(), Some(101));
        let level = matcher.book().bids.get(&101).unwrap();
        assert_eq!(level[0].id, 2);
        assert_eq!(level[0].remaining_quantity(), 20);
    }

    #[test]
    fn test_fifo_priority_within_level() {
        let mut matcher = Matcher::new();
        matcher.place_order(sell(1, 101, 10)).unwrap();
        matcher.place_order(sell(2, 101, 10)).unwrap();

        let trades = matcher.place_order(buy(3, 101, 15)).unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!((trades[0].maker_order_id, trades[0].quantity), (1, 10));
        assert_eq!((trades[1].maker_order_id, trades[1].quantity), (2, 5));

        let level = matcher.book().asks.get(&101).unwrap();
        assert_eq!(level[0].id, 2);
        assert_eq!(level[0].remaining_quantity(), 5);
    }

    #[test]
    fn test_maker_price_beats_aggressive_taker() {
        let mut matcher = Matcher::new();
        matcher.place_order(sell(1, 101, 10)).unwrap();
        let trades = matcher.place_order(buy(2, 110, 10)).unwrap();
        assert_eq!(trades[0].price, 101);
    }

    #[test]
    fn test_cancelled_order_never_trades() {
        let mut matcher = Matcher::new();
        matcher.place_order(buy(1, 100, 10)).unwrap();
        matcher.place_order(buy(2, 100, 10)).unwrap();

        assert!(matcher.cancel_order(1).is_some());

        let trades = matcher.place_order(sell(3, 100, 10)).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].maker_order_id, 2);
        assert_eq!(matcher.best_bid(), None);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut matcher = Matcher::new();
        matcher.place_order(buy(1, 100, 10)).unwrap();
        assert!(matcher.cancel_order(1).is_some());
        assert!(matcher.cancel_order(1).is_none());
        assert!(matcher.cancel_order(99).is_none());
    }

    #[test]
    fn test_filled_order_cannot_be_cancelled() {
        let mut matcher = Matcher::new();
        matcher.place_order(sell(1, 101, 10)).unwrap();
        matcher.place_order(buy(2, 101, 10)).unwrap();
        assert!(matcher.cancel_order(1).is_none());
        assert!(matcher.cancel_order(2).is_none());
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        let mut matcher = Matcher::new();
        assert!(matcher.place_order(buy(1, 100, 0)).is_err());
        assert!(matcher.place_order(buy(2, 100, -5)).is_err());
        assert_eq!(matcher.best_bid(), None);
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let mut matcher = Matcher::new();
        assert!(matcher.place_order(sell(1, 0, 10)).is_err());
        assert!(matcher.place_order(sell(2, -100, 10)).is_err());
        assert_eq!(matcher.best_ask(), None);
    }

    #[test]
    fn test_quantity_conservation_over_random_flow() {
        let mut matcher = Matcher::new();
        let mut rng = StdRng::seed_from_u64(7);
        let mut submitted: Qty = 0;
        let mut traded: Qty = 0;

        for id in 1..=500u64 {
            let side = if rng.gen_bool(0.5) {
                OrderSide::Buy
            } else {
                OrderSide::Sell
            };
            let price = rng.gen_range(90..=110);
            let qty = rng.gen_range(1..=20);
            submitted += qty;
            let trades = matcher.place_order(Order::new(id, side, price, qty)).unwrap();
            traded += trades.iter().map(|t| t.quantity).sum::<Qty>();

            // The book never rests crossed.
            if let (Some(bid), Some(ask)) = (matcher.best_bid(), matcher.best_ask()) {
                assert!(bid < ask, "book crossed at rest: bid {} >= ask {}", bid, ask);
            }
        }

        // Every submitted unit is either traded (once per side) or resting.
        assert_eq!(submitted, 2 * traded + resting_quantity(&matcher));

        // Index consistency after the run.
        let book = matcher.book();
        let resting_count: usize = book.bids.values().map(|q| q.len()).sum::<usize>()
            + book.asks.values().map(|q| q.len()).sum::<usize>();
        assert_eq!(resting_count, book.id_index.len());
        for (id, (side, price)) in &book.id_index {
            let levels = match side {
                OrderSide::Buy => &book.bids,
                OrderSide::Sell => &book.asks,
            };
            let queue = levels.get(price).expect("indexed level missing");
            let order = queue
                .iter()
                .find(|o| o.id == *id)
                .expect("indexed order missing from level");
            assert!(order.remaining_quantity() > 0);
        }
        // No empty levels survive.
        assert!(book.bids.values().all(|q| !q.is_empty()));
        assert!(book.asks.values().all(|q| !q.is_empty()));
    }
}
