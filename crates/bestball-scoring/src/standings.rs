// Contest standings: every roster ranked by best-ball total.

use std::cmp::Ordering;

use serde::Serialize;

use bestball_core::contest::{ContestWeeks, Week};
use bestball_core::roster::Roster;
use bestball_core::scores::{round2, ScoreBook};

use crate::aggregate::roster_total;
use crate::lineup::lineup_for_week;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    /// 1-based; owners with the same best-ball total share a rank.
    pub rank: usize,
    pub owner: String,
    pub best_ball_points: f64,
    pub weekly_points: Vec<(Week, f64)>,
    /// Total from the per-slot aggregators, as a cross-check on
    /// `best_ball_points`.
    pub roster_points: f64,
}

/// Rank rosters by best-ball total, descending. Exact ties are listed by
/// owner name.
pub fn standings(rosters: &[Roster], book: &ScoreBook, weeks: &ContestWeeks) -> Vec<Standing> {
    let mut table: Vec<Standing> = rosters
        .iter()
        .map(|roster| {
            let weekly_points: Vec<(Week, f64)> = weeks
                .iter()
                .map(|w| (w, lineup_for_week(roster, book, w).total_points))
                .collect();
            Standing {
                rank: 0,
                owner: roster.owner.clone(),
                best_ball_points: round2(weekly_points.iter().map(|(_, p)| p).sum()),
                weekly_points,
                roster_points: roster_total(roster, book, weeks),
            }
        })
        .collect();

    table.sort_by(|a, b| {
        b.best_ball_points
            .partial_cmp(&a.best_ball_points)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.owner.cmp(&b.owner))
    });

    for i in 0..table.len() {
        table[i].rank = if i > 0 && table[i].best_ball_points == table[i - 1].best_ball_points {
            table[i - 1].rank
        } else {
            i + 1
        };
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use bestball_core::player::{Player, Position, RosterSlot};
    use bestball_core::PlayerId;

    fn roster(owner: &str) -> Roster {
        let id = |slot: &str| format!("{owner}_{slot}");
        let players = vec![
            (RosterSlot::QB, Player::new(&id("qb"), "QB", Position::QB, "KC")),
            (RosterSlot::RB1, Player::new(&id("rb1"), "RB1", Position::RB, "KC")),
            (RosterSlot::RB2, Player::new(&id("rb2"), "RB2", Position::RB, "BUF")),
            (RosterSlot::WR1, Player::new(&id("wr1"), "WR1", Position::WR, "DET")),
            (RosterSlot::WR2, Player::new(&id("wr2"), "WR2", Position::WR, "PHI")),
            (RosterSlot::TE, Player::new(&id("te"), "TE", Position::TE, "BAL")),
            (RosterSlot::FLEX, Player::new(&id("flex"), "FLEX", Position::RB, "SF")),
            (RosterSlot::K, Player::new(&id("k"), "K", Position::K, "KC")),
            (RosterSlot::DST, Player::new(&id("dst"), "DST", Position::DST, "PHI")),
        ];
        Roster::new(owner, 2025, players).unwrap()
    }

    #[test]
    fn ranks_by_best_ball_total_and_shares_ties() {
        let rosters = vec![roster("carol"), roster("alice"), roster("bob"), roster("dave")];
        let weeks = ContestWeeks::standard();
        let mut book = ScoreBook::new();
        book.insert_points(&PlayerId::new("alice_qb"), 1, 20.0);
        book.insert_points(&PlayerId::new("bob_qb"), 1, 30.0);
        book.insert_points(&PlayerId::new("carol_qb"), 1, 20.0);
        book.insert_points(&PlayerId::new("dave_qb"), 1, 20.0);
        // Week 4 is not a contest week.
        book.insert_points(&PlayerId::new("carol_rb1"), 4, 50.0);

        let table = standings(&rosters, &book, &weeks);
        let order: Vec<(&str, usize)> = table.iter().map(|s| (s.owner.as_str(), s.rank)).collect();
        assert_eq!(
            order,
            vec![("bob", 1), ("alice", 2), ("carol", 2), ("dave", 2)]
        );
        assert_eq!(table[0].weekly_points, vec![(1, 30.0), (2, 0.0), (3, 0.0), (5, 0.0)]);
        assert_eq!(table[1].roster_points, 20.0);
    }

    #[test]
    fn substituted_points_count_and_ties_sort_by_owner() {
        let mut zed = roster("zed");
        let sub = bestball_core::Substitution::new(
            RosterSlot::RB1,
            zed.player(RosterSlot::RB1).clone(),
            Player::new("zed_rb9", "RB9", Position::RB, "KC"),
            2,
            None,
        )
        .unwrap();
        zed.set_substitution(sub, &ContestWeeks::standard()).unwrap();
        let rosters = vec![roster("amy"), zed];
        let weeks = ContestWeeks::standard();

        let mut book = ScoreBook::new();
        book.insert_points(&PlayerId::new("amy_qb"), 1, 10.0);
        book.insert_points(&PlayerId::new("zed_rb9"), 2, 10.0);
        let table = standings(&rosters, &book, &weeks);
        assert_eq!(table[0].owner, "amy");
        assert_eq!(table[1].owner, "zed");
        assert_eq!(table[0].rank, 1);
        assert_eq!(table[1].rank, 1);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        assert!(standings(&[], &ScoreBook::new(), &ContestWeeks::standard()).is_empty());
    }
}
