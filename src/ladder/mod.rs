//! The ranking ladder.
//!
//! An immutable table of `(threshold, rank, label)` entries ordered by
//! threshold. Built once at startup and shared read-only.

use serde::Serialize;
use thiserror::Error;

use crate::models::{Rank, Tier};

/// Ladder construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LadderError {
    #[error("Ladder has no entries")]
    Empty,

    #[error("First ladder threshold must be 0, got {0}")]
    FirstThresholdNotZero(u32),

    #[error("Threshold {threshold} for {rank} does not exceed previous threshold {previous}")]
    ThresholdNotIncreasing {
        rank: Rank,
        threshold: u32,
        previous: u32,
    },

    #[error("Rank {rank} is not above previous rank {previous}")]
    RankOutOfOrder { rank: Rank, previous: Rank },
}

/// One step of the ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LadderEntry {
    pub threshold: u32,
    pub rank: Rank,
    pub label: String,
    pub tier: Tier,
}

impl LadderEntry {
    pub fn new(threshold: u32, rank: Rank, label: impl Into<String>) -> Self {
        Self {
            threshold,
            rank,
            label: label.into(),
            tier: rank.tier(),
        }
    }
}

/// Ordered rank table with lookup queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankLadder {
    entries: Vec<LadderEntry>,
}

impl RankLadder {
    /// Build a ladder, checking that thresholds start at 0 and strictly
    /// increase and that ranks appear in ladder order.
    pub fn new(entries: Vec<LadderEntry>) -> Result<Self, LadderError> {
        let first = entries.first().ok_or(LadderError::Empty)?;
        if first.threshold != 0 {
            return Err(LadderError::FirstThresholdNotZero(first.threshold));
        }

        for pair in entries.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.threshold <= prev.threshold {
                return Err(LadderError::ThresholdNotIncreasing {
                    rank: next.rank,
                    threshold: next.threshold,
                    previous: prev.threshold,
                });
            }
            if next.rank <= prev.rank {
                return Err(LadderError::RankOutOfOrder {
                    rank: next.rank,
                    previous: prev.rank,
                });
            }
        }

        Ok(Self { entries })
    }

    /// The ranked ladder used by the game.
    pub fn standard() -> Self {
        let entries = vec![
            LadderEntry::new(0, Rank::Beginner1, "Beginner 1"),
            LadderEntry::new(20, Rank::Beginner2, "Beginner 2"),
            LadderEntry::new(50, Rank::Beginner3, "Beginner 3"),
            LadderEntry::new(95, Rank::Beginner4, "Beginner 4"),
            LadderEntry::new(145, Rank::PokeBall1, "Poké Ball 1"),
            LadderEntry::new(195, Rank::PokeBall2, "Poké Ball 2"),
            LadderEntry::new(245, Rank::PokeBall3, "Poké Ball 3"),
            LadderEntry::new(300, Rank::PokeBall4, "Poké Ball 4"),
            LadderEntry::new(355, Rank::GreatBall1, "Great Ball 1"),
            LadderEntry::new(420, Rank::GreatBall2, "Great Ball 2"),
            LadderEntry::new(490, Rank::GreatBall3, "Great Ball 3"),
            LadderEntry::new(600, Rank::GreatBall4, "Great Ball 4"),
            LadderEntry::new(710, Rank::UltraBall1, "Ultra Ball 1"),
            LadderEntry::new(860, Rank::UltraBall2, "Ultra Ball 2"),
            LadderEntry::new(1010, Rank::UltraBall3, "Ultra Ball 3"),
            LadderEntry::new(1225, Rank::UltraBall4, "Ultra Ball 4"),
            LadderEntry::new(1450, Rank::MasterBall, "Master Ball"),
        ];
        Self { entries }
    }

    pub fn entries(&self) -> &[LadderEntry] {
        &self.entries
    }

    /// Rank of the entry with the largest threshold not exceeding `points`.
    pub fn rank_for_points(&self, points: u32) -> Rank {
        // Entries are sorted by threshold, so everything before the partition
        // point qualifies and the last of those wins.
        let idx = self
            .entries
            .partition_point(|e| e.threshold <= points)
            .saturating_sub(1);
        self.entries
            .get(idx)
            .map(|e| e.rank)
            .unwrap_or(Rank::Beginner1)
    }

    /// The rank after `rank`, or `rank` itself when it is the last one.
    pub fn next_rank(&self, rank: Rank) -> Rank {
        self.position(rank)
            .and_then(|i| self.entries.get(i + 1))
            .map(|e| e.rank)
            .unwrap_or(rank)
    }

    /// Points at which `rank` begins; 0 for ranks not on this ladder.
    pub fn threshold(&self, rank: Rank) -> u32 {
        self.entry(rank).map(|e| e.threshold).unwrap_or(0)
    }

    /// Display label; falls back to the rank identifier.
    pub fn label(&self, rank: Rank) -> &str {
        self.entry(rank)
            .map(|e| e.label.as_str())
            .unwrap_or_else(|| rank.id())
    }

    /// True when no rank follows `rank`.
    pub fn is_terminal(&self, rank: Rank) -> bool {
        self.next_rank(rank) == rank
    }

    pub fn entry(&self, rank: Rank) -> Option<&LadderEntry> {
        self.entries.iter().find(|e| e.rank == rank)
    }

    fn position(&self, rank: Rank) -> Option<usize> {
        self.entries.iter().position(|e| e.rank == rank)
    }
}

impl Default for RankLadder {
    fn default() -> Self {
        Self::standard()
    }
}
