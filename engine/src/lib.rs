//! Limit-order matching engine for a single instrument.
//!
//! The synchronous core ([`Matcher`]) crosses incoming limit orders against
//! a price-time priority book and supports cancellation by order id. The
//! asynchronous wrapper ([`MatchEngine`]) feeds the core from an inbound
//! order queue on a single worker thread and publishes trade batches on an
//! outbound event queue, with drain-before-exit shutdown.

pub mod config;
pub mod engine;
pub mod metrics;
pub mod queue;
pub mod server;

pub use engine::entry::{
    EngineEvent, Order, OrderId, OrderSide, OrderStatus, Price, Qty, Trade,
};
pub use engine::matchengine::MatchEngine;
pub use engine::matchlogic::{EngineError, Matcher};
pub use queue::ConcurrentQueue;
