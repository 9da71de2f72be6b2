//! The persisted stats aggregate and the names used to address it.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current competitive state of the tracked player.
///
/// Missing fields deserialize as 0. The field names written by older
/// trackers (`Wins`, `Looses`, `WinStreaks`, ...) are accepted as aliases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    #[serde(alias = "Wins")]
    pub wins: u32,

    #[serde(alias = "looses", alias = "Looses", alias = "Losses")]
    pub losses: u32,

    #[serde(alias = "Ties")]
    pub ties: u32,

    #[serde(alias = "Points")]
    pub points: u32,

    /// Points at the reference point (season start). Only changed by explicit sets.
    #[serde(alias = "pointsStarted", alias = "PointsStarted")]
    pub points_started: u32,

    /// Consecutive wins since the last loss or tie.
    #[serde(
        alias = "winStreak",
        alias = "win_streaks",
        alias = "winStreaks",
        alias = "WinStreaks"
    )]
    pub win_streak: u32,
}

impl Stats {
    /// Total recorded matches.
    pub fn games_played(&self) -> u64 {
        u64::from(self.wins) + u64::from(self.losses) + u64::from(self.ties)
    }

    /// Fraction of recorded matches that were wins, 0.0 with no matches.
    pub fn win_rate(&self) -> f64 {
        let total = self.games_played();
        if total == 0 {
            0.0
        } else {
            f64::from(self.wins) / total as f64
        }
    }

    /// Points gained (or lost) since `points_started`.
    pub fn points_since_start(&self) -> i64 {
        i64::from(self.points) - i64::from(self.points_started)
    }

    pub fn get(&self, field: StatField) -> u32 {
        match field {
            StatField::Wins => self.wins,
            StatField::Losses => self.losses,
            StatField::Ties => self.ties,
            StatField::Points => self.points,
            StatField::PointsStarted => self.points_started,
            StatField::WinStreak => self.win_streak,
        }
    }

    pub fn set(&mut self, field: StatField, value: u32) {
        let slot = match field {
            StatField::Wins => &mut self.wins,
            StatField::Losses => &mut self.losses,
            StatField::Ties => &mut self.ties,
            StatField::Points => &mut self.points,
            StatField::PointsStarted => &mut self.points_started,
            StatField::WinStreak => &mut self.win_streak,
        };
        *slot = value;
    }
}

/// Error returned when a field or outcome name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {name}")]
pub struct ParseNameError {
    kind: &'static str,
    name: String,
}

/// Individually addressable field of [`Stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatField {
    Wins,
    #[serde(alias = "looses")]
    Losses,
    Ties,
    Points,
    PointsStarted,
    #[serde(alias = "win_streaks")]
    WinStreak,
}

impl StatField {
    pub const ALL: [StatField; 6] = [
        StatField::Wins,
        StatField::Losses,
        StatField::Ties,
        StatField::Points,
        StatField::PointsStarted,
        StatField::WinStreak,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StatField::Wins => "wins",
            StatField::Losses => "losses",
            StatField::Ties => "ties",
            StatField::Points => "points",
            StatField::PointsStarted => "points_started",
            StatField::WinStreak => "win_streak",
        }
    }
}

impl std::fmt::Display for StatField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for StatField {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "wins" => Ok(StatField::Wins),
            "losses" | "looses" => Ok(StatField::Losses),
            "ties" => Ok(StatField::Ties),
            "points" => Ok(StatField::Points),
            "points_started" | "pointsstarted" => Ok(StatField::PointsStarted),
            "win_streak" | "win_streaks" | "winstreak" | "winstreaks" => Ok(StatField::WinStreak),
            _ => Err(ParseNameError {
                kind: "stat field",
                name: s.to_string(),
            }),
        }
    }
}

/// Result of a single match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    #[serde(alias = "loose")]
    Loss,
    Tie,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win => write!(f, "win"),
            Outcome::Loss => write!(f, "loss"),
            Outcome::Tie => write!(f, "tie"),
        }
    }
}

impl FromStr for Outcome {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "win" => Ok(Outcome::Win),
            "loss" | "lose" | "loose" => Ok(Outcome::Loss),
            "tie" | "draw" => Ok(Outcome::Tie),
            _ => Err(ParseNameError {
                kind: "outcome",
                name: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stats_default_is_zero() {
        let stats = Stats::default();
        for field in StatField::ALL {
            assert_eq!(stats.get(field), 0);
        }
    }

    #[test]
    fn test_stats_missing_fields_default_to_zero() {
        let stats: Stats = serde_json::from_str(r#"{"wins": 4, "points": 55}"#).unwrap();
        assert_eq!(
            stats,
            Stats {
                wins: 4,
                points: 55,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_stats_accepts_legacy_keys() {
        let json = r#"{"WinStreaks":2,"Wins":7,"Looses":3,"Ties":1,"Points":160,"PointsStarted":100}"#;
        let stats: Stats = serde_json::from_str(json).unwrap();
        assert_eq!(
            stats,
            Stats {
                wins: 7,
                losses: 3,
                ties: 1,
                points: 160,
                points_started: 100,
                win_streak: 2,
            }
        );
    }

    #[test]
    fn test_stats_json_roundtrip() {
        let stats = Stats {
            wins: 12,
            losses: 5,
            ties: 2,
            points: 431,
            points_started: 355,
            win_streak: 3,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"points_started\":355"));
        let parsed: Stats = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, stats);
    }

    #[test]
    fn test_stats_rejects_negative_values() {
        assert!(serde_json::from_str::<Stats>(r#"{"points": -5}"#).is_err());
    }

    #[test]
    fn test_get_set_each_field() {
        let mut stats = Stats::default();
        for (i, field) in StatField::ALL.into_iter().enumerate() {
            stats.set(field, i as u32 + 1);
        }
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.losses, 2);
        assert_eq!(stats.ties, 3);
        assert_eq!(stats.points, 4);
        assert_eq!(stats.points_started, 5);
        assert_eq!(stats.win_streak, 6);
    }

    #[test]
    fn test_win_rate() {
        assert_eq!(Stats::default().win_rate(), 0.0);

        let stats = Stats {
            wins: 3,
            losses: 1,
            ..Default::default()
        };
        assert!((stats.win_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(stats.games_played(), 4);
    }

    #[test]
    fn test_points_since_start_can_be_negative() {
        let stats = Stats {
            points: 340,
            points_started: 355,
            ..Default::default()
        };
        assert_eq!(stats.points_since_start(), -15);
    }

    #[test]
    fn test_stat_field_parse() {
        assert_eq!("wins".parse::<StatField>().unwrap(), StatField::Wins);
        assert_eq!("looses".parse::<StatField>().unwrap(), StatField::Losses);
        assert_eq!(
            "points-started".parse::<StatField>().unwrap(),
            StatField::PointsStarted
        );
        assert_eq!(
            "WinStreaks".parse::<StatField>().unwrap(),
            StatField::WinStreak
        );
        assert!("elo".parse::<StatField>().is_err());
    }

    #[test]
    fn test_stat_field_name_parses_back() {
        for field in StatField::ALL {
            assert_eq!(field.name().parse::<StatField>().unwrap(), field);
        }
    }

    #[test]
    fn test_outcome_parse() {
        assert_eq!("win".parse::<Outcome>().unwrap(), Outcome::Win);
        assert_eq!("loose".parse::<Outcome>().unwrap(), Outcome::Loss);
        assert_eq!("TIE".parse::<Outcome>().unwrap(), Outcome::Tie);
        let err = "forfeit".parse::<Outcome>().unwrap_err();
        assert_eq!(err.to_string(), "unknown outcome: forfeit");
    }

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(serde_json::to_string(&Outcome::Loss).unwrap(), "\"loss\"");
        let parsed: Outcome = serde_json::from_str("\"loose\"").unwrap();
        assert_eq!(parsed, Outcome::Loss);
    }
}
