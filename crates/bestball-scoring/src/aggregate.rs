// Score aggregation across contest weeks, splicing in a substitute's points
// from the substitution's effective week onward.

use bestball_core::contest::{ContestWeeks, Week};
use bestball_core::player::RosterSlot;
use bestball_core::roster::Roster;
use bestball_core::scores::{round2, ScoreBook, WeeklyScores};

/// Weekly points for one roster slot.
///
/// Trusts its inputs: position compatibility of the substitute is checked
/// when the substitution is created, not here.
#[derive(Debug, Clone, Copy)]
pub struct SlotAggregator<'a> {
    original: &'a WeeklyScores,
    substitution: Option<(Week, &'a WeeklyScores)>,
    weeks: &'a ContestWeeks,
}

impl<'a> SlotAggregator<'a> {
    /// Aggregator for a slot with no substitution: a pass-through of the
    /// original player's scores.
    pub fn new(original: &'a WeeklyScores, weeks: &'a ContestWeeks) -> Self {
        SlotAggregator {
            original,
            substitution: None,
            weeks,
        }
    }

    /// Count `substitute`'s points from `effective_week` onward.
    pub fn with_substitution(mut self, effective_week: Week, substitute: &'a WeeklyScores) -> Self {
        self.substitution = Some((effective_week, substitute));
        self
    }

    /// Aggregator for one slot of a roster, resolving the roster's
    /// substitution if it governs that slot.
    pub fn for_slot(
        roster: &Roster,
        slot: RosterSlot,
        book: &'a ScoreBook,
        weeks: &'a ContestWeeks,
    ) -> Self {
        let (original, substitution) = slot_scores(roster, slot, book);
        SlotAggregator {
            original,
            substitution,
            weeks,
        }
    }

    /// Points that count for `week`. Missing data reads as 0.
    pub fn effective_points(&self, week: Week) -> f64 {
        split_points(self.original, self.substitution, week)
    }

    /// Sum of effective points over every contest week.
    pub fn total_points(&self) -> f64 {
        round2(self.weeks.iter().map(|w| self.effective_points(w)).sum())
    }

    /// `(week, points)` for every contest week, ascending.
    pub fn weekly_breakdown(&self) -> Vec<(Week, f64)> {
        self.weeks
            .iter()
            .map(|w| (w, self.effective_points(w)))
            .collect()
    }
}

/// Points that count for one roster slot in one week, substitution applied.
pub fn slot_points(roster: &Roster, slot: RosterSlot, book: &ScoreBook, week: Week) -> f64 {
    let (original, substitution) = slot_scores(roster, slot, book);
    split_points(original, substitution, week)
}

fn slot_scores<'a>(
    roster: &Roster,
    slot: RosterSlot,
    book: &'a ScoreBook,
) -> (&'a WeeklyScores, Option<(Week, &'a WeeklyScores)>) {
    let original = book.weekly(&roster.player(slot).id);
    match roster.substitution() {
        Some(sub) if sub.slot() == slot => {
            (original, Some((sub.effective_week(), book.weekly(&sub.substitute().id))))
        }
        _ => (original, None),
    }
}

fn split_points(original: &WeeklyScores, substitution: Option<(Week, &WeeklyScores)>, week: Week) -> f64 {
    match substitution {
        Some((effective_week, substitute)) if week >= effective_week => substitute.points(week),
        _ => original.points(week),
    }
}

/// Total of all nine slots with every player counted, substitutions applied.
///
/// This is the "everyone starts" total. Standings report it next to the
/// best-ball total.
pub fn roster_total(roster: &Roster, book: &ScoreBook, weeks: &ContestWeeks) -> f64 {
    round2(
        RosterSlot::ALL
            .iter()
            .map(|&slot| SlotAggregator::for_slot(roster, slot, book, weeks).total_points())
            .sum(),
    )
}
