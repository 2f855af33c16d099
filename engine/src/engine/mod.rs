//! Match Engine Module
//!
//! Core components of the matching engine:
//! - `data`: order book storage
//! - `entry`: order, trade and event types
//! - `matchengine`: asynchronous single-writer engine
//! - `matchlogic`: matching algorithm

pub mod data;
pub mod entry;
pub mod matchengine;
pub mod matchlogic;
