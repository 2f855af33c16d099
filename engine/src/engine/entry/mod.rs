pub mod event;
pub mod order;
pub mod trade;

pub use event::EngineEvent;
pub use order::{monotonic_nanos, Order, OrderId, OrderSide, OrderStatus, Price, Qty};
pub use trade::Trade;
