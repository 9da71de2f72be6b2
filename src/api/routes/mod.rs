pub mod hub;
pub mod rank;
pub mod stats;
