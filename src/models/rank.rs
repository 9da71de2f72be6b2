//! Ladder ranks and the tiers they are grouped into.

use serde::{Deserialize, Serialize};

/// Tier grouping of consecutive ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Beginner,
    PokeBall,
    GreatBall,
    UltraBall,
    Master,
}

impl Tier {
    /// Human readable tier name.
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Beginner => "Beginner",
            Tier::PokeBall => "Poké Ball",
            Tier::GreatBall => "Great Ball",
            Tier::UltraBall => "Ultra Ball",
            Tier::Master => "Master Ball",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A rank on the progression ladder, in ladder order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Beginner1,
    Beginner2,
    Beginner3,
    Beginner4,
    PokeBall1,
    PokeBall2,
    PokeBall3,
    PokeBall4,
    GreatBall1,
    GreatBall2,
    GreatBall3,
    GreatBall4,
    UltraBall1,
    UltraBall2,
    UltraBall3,
    UltraBall4,
    MasterBall,
}

impl Rank {
    /// Every rank, lowest first.
    pub const ALL: [Rank; 17] = [
        Rank::Beginner1,
        Rank::Beginner2,
        Rank::Beginner3,
        Rank::Beginner4,
        Rank::PokeBall1,
        Rank::PokeBall2,
        Rank::PokeBall3,
        Rank::PokeBall4,
        Rank::GreatBall1,
        Rank::GreatBall2,
        Rank::GreatBall3,
        Rank::GreatBall4,
        Rank::UltraBall1,
        Rank::UltraBall2,
        Rank::UltraBall3,
        Rank::UltraBall4,
        Rank::MasterBall,
    ];

    /// The tier this rank belongs to.
    pub fn tier(&self) -> Tier {
        match self {
            Rank::Beginner1 | Rank::Beginner2 | Rank::Beginner3 | Rank::Beginner4 => {
                Tier::Beginner
            }
            Rank::PokeBall1 | Rank::PokeBall2 | Rank::PokeBall3 | Rank::PokeBall4 => {
                Tier::PokeBall
            }
            Rank::GreatBall1 | Rank::GreatBall2 | Rank::GreatBall3 | Rank::GreatBall4 => {
                Tier::GreatBall
            }
            Rank::UltraBall1 | Rank::UltraBall2 | Rank::UltraBall3 | Rank::UltraBall4 => {
                Tier::UltraBall
            }
            Rank::MasterBall => Tier::Master,
        }
    }

    /// Stable identifier, used as the label fallback for ranks missing from a ladder.
    pub fn id(&self) -> &'static str {
        match self {
            Rank::Beginner1 => "Beginner1",
            Rank::Beginner2 => "Beginner2",
            Rank::Beginner3 => "Beginner3",
            Rank::Beginner4 => "Beginner4",
            Rank::PokeBall1 => "PokeBall1",
            Rank::PokeBall2 => "PokeBall2",
            Rank::PokeBall3 => "PokeBall3",
            Rank::PokeBall4 => "PokeBall4",
            Rank::GreatBall1 => "GreatBall1",
            Rank::GreatBall2 => "GreatBall2",
            Rank::GreatBall3 => "GreatBall3",
            Rank::GreatBall4 => "GreatBall4",
            Rank::UltraBall1 => "UltraBall1",
            Rank::UltraBall2 => "UltraBall2",
            Rank::UltraBall3 => "UltraBall3",
            Rank::UltraBall4 => "UltraBall4",
            Rank::MasterBall => "MasterBall",
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_order_matches_all() {
        let mut sorted = Rank::ALL;
        sorted.sort();
        assert_eq!(sorted, Rank::ALL);
    }

    #[test]
    fn test_rank_tiers() {
        assert_eq!(Rank::Beginner4.tier(), Tier::Beginner);
        assert_eq!(Rank::PokeBall1.tier(), Tier::PokeBall);
        assert_eq!(Rank::GreatBall3.tier(), Tier::GreatBall);
        assert_eq!(Rank::UltraBall4.tier(), Tier::UltraBall);
        assert_eq!(Rank::MasterBall.tier(), Tier::Master);
    }

    #[test]
    fn test_tiers_are_monotonic_along_ladder() {
        for pair in Rank::ALL.windows(2) {
            assert!(pair[0].tier() <= pair[1].tier());
        }
    }

    #[test]
    fn test_rank_serialization() {
        let json = serde_json::to_string(&Rank::UltraBall2).unwrap();
        assert_eq!(json, "\"UltraBall2\"");

        let parsed: Rank = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Rank::UltraBall2);
    }

    #[test]
    fn test_tier_serialization() {
        assert_eq!(
            serde_json::to_string(&Tier::GreatBall).unwrap(),
            "\"great_ball\""
        );
    }

    #[test]
    fn test_rank_display() {
        assert_eq!(format!("{}", Rank::PokeBall3), "PokeBall3");
        assert_eq!(format!("{}", Tier::UltraBall), "Ultra Ball");
    }
}
