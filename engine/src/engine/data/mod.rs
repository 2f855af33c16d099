//! Data Structures Module
//!
//! Core data structures used throughout the matching engine. Currently the
//! order book, which stores resting orders for the instrument.

pub mod orderbook;

pub use orderbook::OrderBook;
