use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Caller-assigned order identifier, unique per engine lifetime.
pub type OrderId = u64;
/// Price in integer ticks.
pub type Price = i64;
/// Quantity in whole units.
pub type Qty = i64;

static CLOCK_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Nanoseconds since process start on a monotonic clock.
///
/// Timestamps are diagnostic only; priority within a level is arrival order.
pub fn monotonic_nanos() -> u64 {
    CLOCK_EPOCH.elapsed().as_nanos() as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OrderSide {
    #[default]
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    New,
    PartiallyFilled,
    Filled,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: OrderSide,
    pub price: Price,
    pub quantity: Qty,
    pub filled_quantity: Qty,
    pub status: OrderStatus,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Order {
    pub fn new(id: OrderId, side: OrderSide, price: Price, quantity: Qty) -> Self {
        let now = monotonic_nanos();
        Self {
            id,
            side,
            price,
            quantity,
            filled_quantity: 0,
            status: OrderStatus::New,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn remaining_quantity(&self) -> Qty {
        self.quantity - self.filled_quantity
    }

    pub fn is_filled(&self) -> bool {
        self.filled_quantity >= self.quantity
    }

    pub fn update_status(&mut self) {
        if self.is_filled() {
            self.status = OrderStatus::Filled;
        } else if self.filled_quantity > 0 {
            self.status = OrderStatus::PartiallyFilled;
        }
        self.updated_at = monotonic_nanos();
    }
}
