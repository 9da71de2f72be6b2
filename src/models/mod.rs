//! Core data models for the rank tracker.

mod rank;
mod stats;

pub use rank::*;
pub use stats::*;
