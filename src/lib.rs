//! # Rank Tracker
//!
//! Tracks a player's ranked ladder progress and broadcasts every change to
//! live subscribers.
//!
//! ## Architecture
//!
//! - **models**: Stats aggregate, ranks, tiers, outcomes and field names
//! - **ladder**: Ordered point thresholds and rank lookup
//! - **progression**: Win/loss/tie rules and win-count projections
//! - **storage**: Serialized, persisted access to the single stats record
//! - **hub**: Subscriber registry and fan-out of committed snapshots
//! - **service**: Operation surface shared by the API and the CLI
//! - **api**: REST endpoints and the WebSocket stats hub
//! - **config**: Configuration loading and validation

pub mod api;
pub mod config;
pub mod hub;
pub mod ladder;
pub mod models;
pub mod progression;
pub mod service;
pub mod storage;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "5s", "2m", "1h").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    num.checked_mul(multiplier).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_hours() {
        assert_eq!(parse_duration("1h"), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_parse_duration_minutes() {
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_parse_duration_seconds() {
        assert_eq!(parse_duration("5s"), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_parse_duration_default_seconds() {
        assert_eq!(parse_duration("30"), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert_eq!(parse_duration("soon"), None);
        assert_eq!(parse_duration("-5s"), None);
    }

    #[test]
    fn test_parse_duration_empty() {
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn test_parse_duration_zero() {
        assert_eq!(parse_duration("0s"), Some(Duration::from_secs(0)));
    }

    #[test]
    fn test_parse_duration_whitespace() {
        assert_eq!(parse_duration(" 5s "), Some(Duration::from_secs(5)));
    }
}
