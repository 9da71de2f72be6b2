//! Progression engine.
//!
//! Pure functions turning match outcomes into new [`Stats`]:
//! - Win points with streak bonus
//! - Loss penalties by tier, with floor protection on tier entry ranks
//! - Win-count projections toward a points target

use serde::Serialize;

use crate::ladder::RankLadder;
use crate::models::{Outcome, Rank, Stats, Tier};

/// Points for any win before the streak bonus.
pub const BASE_WIN_POINTS: u32 = 10;

/// Bonus for a win given the streak length after that win. Saturates at 5.
pub fn streak_bonus(streak: u32) -> u32 {
    match streak {
        0 | 1 => 0,
        2 => 3,
        3 => 6,
        4 => 9,
        _ => 12,
    }
}

/// Total points for a win that brings the streak to `streak`.
pub fn win_points(streak: u32) -> u32 {
    BASE_WIN_POINTS + streak_bonus(streak)
}

/// Points lost on a loss at `rank`.
pub fn loss_penalty(rank: Rank) -> u32 {
    match rank.tier() {
        Tier::Master => 10,
        Tier::UltraBall => 7,
        Tier::GreatBall | Tier::PokeBall => 5,
        Tier::Beginner => 0,
    }
}

/// Ranks a loss can never demote out of.
pub fn is_protected(rank: Rank) -> bool {
    matches!(rank, Rank::GreatBall1 | Rank::UltraBall1 | Rank::MasterBall)
}

/// Apply one outcome to `stats`, returning the new aggregate.
///
/// `points_started` is never touched here.
pub fn apply_outcome(ladder: &RankLadder, stats: &Stats, outcome: Outcome) -> Stats {
    let mut next = *stats;
    match outcome {
        Outcome::Win => {
            next.wins = next.wins.saturating_add(1);
            next.win_streak = next.win_streak.saturating_add(1);
            next.points = next.points.saturating_add(win_points(next.win_streak));
        }
        Outcome::Loss => {
            next.losses = next.losses.saturating_add(1);
            next.win_streak = 0;
            next.points = points_after_loss(ladder, stats.points);
        }
        Outcome::Tie => {
            next.ties = next.ties.saturating_add(1);
            next.win_streak = 0;
        }
    }
    next
}

/// Points after a loss from `points`, never below 0 and never below the
/// threshold of a protected current rank.
pub fn points_after_loss(ladder: &RankLadder, points: u32) -> u32 {
    let rank = ladder.rank_for_points(points);
    let lowered = points.saturating_sub(loss_penalty(rank));

    if is_protected(rank) {
        lowered.max(ladder.threshold(rank))
    } else {
        lowered
    }
}

/// Number of consecutive wins needed to go from `current` to at least
/// `target` points, starting at win streak `streak`.
pub fn wins_to_reach_points(target: u32, current: u32, streak: u32) -> u32 {
    if current >= target {
        return 0;
    }

    let needed = u64::from(target - current);
    let mut gained: u64 = 0;
    let mut streak = streak;
    let mut wins = 0;

    while gained < needed {
        wins += 1;
        streak = streak.saturating_add(1);
        gained += u64::from(win_points(streak));
    }

    wins
}

/// Wins needed to reach the next rank; 0 at the last rank.
pub fn wins_to_next_rank(ladder: &RankLadder, points: u32, streak: u32) -> u32 {
    let rank = ladder.rank_for_points(points);
    let next = ladder.next_rank(rank);
    if next == rank {
        return 0;
    }
    wins_to_reach_points(ladder.threshold(next), points, streak)
}

/// The next multiple of 100 strictly above `points`.
pub fn next_hundred(points: u32) -> u32 {
    (points / 100).saturating_add(1).saturating_mul(100)
}

pub fn wins_to_next_hundred(points: u32, streak: u32) -> u32 {
    wins_to_reach_points(next_hundred(points), points, streak)
}

/// Read model of where the player stands on the ladder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankProgress {
    pub points: u32,
    pub rank: Rank,
    pub label: String,
    pub tier: Tier,
    pub threshold: u32,
    /// `None` at the last rank
    pub next_rank: Option<NextRank>,
    pub wins_to_next_rank: u32,
    pub next_hundred: u32,
    pub wins_to_next_hundred: u32,
    pub win_streak: u32,
    pub games_played: u64,
    pub win_rate: f64,
    pub points_since_start: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextRank {
    pub rank: Rank,
    pub label: String,
    pub threshold: u32,
    pub points_needed: u32,
}

impl RankProgress {
    pub fn from_stats(ladder: &RankLadder, stats: &Stats) -> Self {
        let rank = ladder.rank_for_points(stats.points);
        let next = ladder.next_rank(rank);
        let next_rank = (next != rank).then(|| {
            let threshold = ladder.threshold(next);
            NextRank {
                rank: next,
                label: ladder.label(next).to_string(),
                threshold,
                points_needed: threshold.saturating_sub(stats.points),
            }
        });

        Self {
            points: stats.points,
            rank,
            label: ladder.label(rank).to_string(),
            tier: rank.tier(),
            threshold: ladder.threshold(rank),
            next_rank,
            wins_to_next_rank: wins_to_next_rank(ladder, stats.points, stats.win_streak),
            next_hundred: next_hundred(stats.points),
            wins_to_next_hundred: wins_to_next_hundred(stats.points, stats.win_streak),
            win_streak: stats.win_streak,
            games_played: stats.games_played(),
            win_rate: stats.win_rate(),
            points_since_start: stats.points_since_start(),
        }
    }
}
