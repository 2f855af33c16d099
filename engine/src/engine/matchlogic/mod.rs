//! Match Logic Module
//!
//! Implements the core matching algorithm: incoming limit orders cross the
//! resting book under price-time priority, the unfilled residual rests.

pub mod matcher;

pub use matcher::{EngineError, Matcher};
