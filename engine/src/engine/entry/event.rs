use serde::{Deserialize, Serialize};

use super::trade::Trade;

/// Events published by the engine worker, one per processed order that
/// produced any trades. Consumers see the full effect of each order in a
/// single batch, in processing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub enum EngineEvent {
    TradeBatch { trades: Vec<Trade> },
}
