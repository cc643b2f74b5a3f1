// Computed fantasy scores and per-player weekly score tables.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::contest::Week;
use crate::player::PlayerId;

/// Round to 2 decimal places, ties rounding up (toward +inf).
///
/// The small nudge absorbs binary representation error so that values like
/// 12.345 (stored as 12.34499...) still round up.
pub fn round2(value: f64) -> f64 {
    ((value * 100.0) + 0.5 + 1e-9).floor() / 100.0
}

/// Computed result for one (player, week, year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub player_id: PlayerId,
    pub week: Week,
    pub year: u16,
    /// Total points, rounded to 2 decimals.
    pub points: f64,
    /// Points contributed per stat category. Sums to `points` within
    /// rounding tolerance. Empty when the breakdown was not kept.
    #[serde(default)]
    pub breakdown: BTreeMap<String, f64>,
}

/// One player's points keyed by week. A missing week reads as 0 points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyScores {
    by_week: BTreeMap<Week, f64>,
}

impl WeeklyScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(week, points)` pairs. Later pairs replace earlier ones.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Week, f64)>) -> Self {
        WeeklyScores {
            by_week: pairs.into_iter().collect(),
        }
    }

    /// Points for `week`, or 0 if there is no row (bye, no game, not yet played).
    pub fn points(&self, week: Week) -> f64 {
        self.by_week.get(&week).copied().unwrap_or(0.0)
    }

    /// Whether a row exists for `week`. A stored 0 counts as present.
    pub fn has_week(&self, week: Week) -> bool {
        self.by_week.contains_key(&week)
    }

    /// Replace the stored value for `week`.
    pub fn set(&mut self, week: Week, points: f64) {
        self.by_week.insert(week, points);
    }

    /// Stored rows, ascending by week.
    pub fn iter(&self) -> impl Iterator<Item = (Week, f64)> + '_ {
        self.by_week.iter().map(|(w, p)| (*w, *p))
    }

    pub fn len(&self) -> usize {
        self.by_week.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_week.is_empty()
    }
}

/// All loaded scores, keyed by player.
#[derive(Debug, Clone, Default)]
pub struct ScoreBook {
    players: HashMap<PlayerId, WeeklyScores>,
    breakdowns: HashMap<(PlayerId, Week), BTreeMap<String, f64>>,
}

impl ScoreBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the score for `(player, week)`. A recompute replaces
    /// the previous row wholesale, including its breakdown.
    pub fn upsert(&mut self, score: PlayerScore) {
        let PlayerScore {
            player_id,
            week,
            points,
            breakdown,
            ..
        } = score;
        self.players
            .entry(player_id.clone())
            .or_default()
            .set(week, points);
        self.breakdowns.insert((player_id, week), breakdown);
    }

    /// Convenience for tests and callers that only have totals.
    pub fn insert_points(&mut self, player_id: &PlayerId, week: Week, points: f64) {
        self.players
            .entry(player_id.clone())
            .or_default()
            .set(week, points);
        self.breakdowns.remove(&(player_id.clone(), week));
    }

    /// Weekly scores for a player. Unknown players read as an empty table.
    pub fn weekly(&self, player_id: &PlayerId) -> &WeeklyScores {
        static EMPTY: WeeklyScores = WeeklyScores {
            by_week: BTreeMap::new(),
        };
        self.players.get(player_id).unwrap_or(&EMPTY)
    }

    pub fn points(&self, player_id: &PlayerId, week: Week) -> f64 {
        self.weekly(player_id).points(week)
    }

    pub fn breakdown(&self, player_id: &PlayerId, week: Week) -> Option<&BTreeMap<String, f64>> {
        self.breakdowns.get(&(player_id.clone(), week))
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}
