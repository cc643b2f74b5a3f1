// Best-ball lineup optimizer: the point-maximizing assignment of a roster's
// players to the nine lineup slots for a week.

use std::collections::HashSet;

use serde::Serialize;

use bestball_core::contest::{ContestWeeks, Week};
use bestball_core::player::{Player, Position, RosterSlot};
use bestball_core::roster::Roster;
use bestball_core::scores::{round2, ScoreBook};

use crate::aggregate::slot_points;

/// Order in which slots are filled. FLEX goes last so it only sees players
/// the single-position slots left behind.
const FILL_ORDER: [RosterSlot; 9] = [
    RosterSlot::QB,
    RosterSlot::RB1,
    RosterSlot::RB2,
    RosterSlot::WR1,
    RosterSlot::WR2,
    RosterSlot::TE,
    RosterSlot::K,
    RosterSlot::DST,
    RosterSlot::FLEX,
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A player available to the optimizer, with the slot they were rostered in
/// and their points for the week being optimized.
#[derive(Debug, Clone, PartialEq)]
pub struct LineupCandidate {
    pub source_slot: RosterSlot,
    pub player: Player,
    pub points: f64,
}

impl LineupCandidate {
    pub fn new(source_slot: RosterSlot, player: Player, points: f64) -> Self {
        LineupCandidate {
            source_slot,
            player,
            points,
        }
    }

    pub fn position(&self) -> Position {
        self.player.position
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Starter {
    pub slot: RosterSlot,
    pub source_slot: RosterSlot,
    pub player: Player,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchPlayer {
    pub source_slot: RosterSlot,
    pub player: Player,
    pub points: f64,
}

/// The optimal lineup for one week. Starters are in slot display order; a
/// slot with no eligible player is absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestBallLineup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<Week>,
    pub starters: Vec<Starter>,
    pub bench: Vec<BenchPlayer>,
    pub total_points: f64,
}

impl BestBallLineup {
    pub fn starter(&self, slot: RosterSlot) -> Option<&Starter> {
        self.starters.iter().find(|s| s.slot == slot)
    }
}

// ---------------------------------------------------------------------------
// Optimizer
// ---------------------------------------------------------------------------

/// Greedy best-ball selection over `candidates` (in source order).
///
/// Each single-position slot takes the highest-scoring unused player of its
/// position; FLEX then takes the highest-scoring unused RB/WR/TE. Exact ties
/// go to the earlier candidate.
pub fn optimal_lineup(candidates: &[LineupCandidate]) -> BestBallLineup {
    let mut used: HashSet<usize> = HashSet::new();
    let mut starters = Vec::with_capacity(FILL_ORDER.len());

    for slot in FILL_ORDER {
        if let Some(index) = best_unused(candidates, &used, slot) {
            used.insert(index);
            let c = &candidates[index];
            starters.push(Starter {
                slot,
                source_slot: c.source_slot,
                player: c.player.clone(),
                points: c.points,
            });
        }
    }
    starters.sort_by_key(|s| s.slot);

    let bench = candidates
        .iter()
        .enumerate()
        .filter(|(i, _)| !used.contains(i))
        .map(|(_, c)| BenchPlayer {
            source_slot: c.source_slot,
            player: c.player.clone(),
            points: c.points,
        })
        .collect();

    BestBallLineup {
        week: None,
        total_points: round2(starters.iter().map(|s| s.points).sum()),
        starters,
        bench,
    }
}

fn best_unused(candidates: &[LineupCandidate], used: &HashSet<usize>, slot: RosterSlot) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, c) in candidates.iter().enumerate() {
        if used.contains(&i) || !slot.accepts(c.position()) {
            continue;
        }
        // Strictly greater keeps the earliest of equal scores.
        if best.map_or(true, |(_, points)| c.points > points) {
            best = Some((i, c.points));
        }
    }
    best.map(|(i, _)| i)
}

// ---------------------------------------------------------------------------
// Roster helpers
// ---------------------------------------------------------------------------

/// Candidates for `week`: each slot's effective player (substitute from the
/// effective week on) with that player's points for the week.
pub fn candidates_for_week(roster: &Roster, book: &ScoreBook, week: Week) -> Vec<LineupCandidate> {
    roster
        .effective_entries(week)
        .into_iter()
        .map(|(slot, player)| LineupCandidate::new(slot, player.clone(), slot_points(roster, slot, book, week)))
        .collect()
}

pub fn lineup_for_week(roster: &Roster, book: &ScoreBook, week: Week) -> BestBallLineup {
    BestBallLineup {
        week: Some(week),
        ..optimal_lineup(&candidates_for_week(roster, book, week))
    }
}

/// One lineup per contest week, in week order.
pub fn season_lineups(roster: &Roster, book: &ScoreBook, weeks: &ContestWeeks) -> Vec<BestBallLineup> {
    weeks.iter().map(|w| lineup_for_week(roster, book, w)).collect()
}

/// Sum of the weekly best-ball totals over the contest weeks.
pub fn total_best_ball_points(roster: &Roster, book: &ScoreBook, weeks: &ContestWeeks) -> f64 {
    round2(
        weeks
            .iter()
            .map(|w| lineup_for_week(roster, book, w).total_points)
            .sum(),
    )
}
