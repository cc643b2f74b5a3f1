// Projection engine: next-week point estimates from playoff history, with a
// per-position fallback and win-probability expected value.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use bestball_core::config::PositionBaselines;
use bestball_core::contest::{ContestWeeks, Week};
use bestball_core::player::{Player, PlayerId, Position, RosterSlot};
use bestball_core::roster::Roster;
use bestball_core::scores::{round2, ScoreBook};
use bestball_core::stats::PlayerStats;

/// Stat lines keyed by (player, week), as loaded from the stats feed.
pub type StatLines = HashMap<(PlayerId, Week), PlayerStats>;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn display_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }

    fn from_games(games: usize) -> Self {
        match games {
            0 => Confidence::Low,
            1 => Confidence::Medium,
            _ => Confidence::High,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}

/// Where a projection's number came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionBasis {
    #[serde(rename = "position_avg")]
    PositionAverage,
    #[serde(rename = "playoff_avg")]
    PlayoffAverage,
}

impl ProjectionBasis {
    pub fn display_str(&self) -> &'static str {
        match self {
            ProjectionBasis::PositionAverage => "position_avg",
            ProjectionBasis::PlayoffAverage => "playoff_avg",
        }
    }
}

impl fmt::Display for ProjectionBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}

/// One past week for a player: its point total and, when available, the
/// stat line behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct PastGame {
    pub week: Week,
    pub points: f64,
    pub stats: Option<PlayerStats>,
}

impl PastGame {
    pub fn new(week: Week, points: f64) -> Self {
        PastGame {
            week,
            points,
            stats: None,
        }
    }

    pub fn with_stats(mut self, stats: PlayerStats) -> Self {
        self.stats = Some(stats);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionResult {
    pub projected_points: f64,
    pub confidence: Confidence,
    pub basis: ProjectionBasis,
    pub games_played: usize,
    /// Mean per stat category over qualifying games with stat lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stat_projection: Option<BTreeMap<String, f64>>,
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Project next-week points for a player at `position`.
///
/// Only games with `points > 0` qualify; a 0 is read as "did not play". With
/// no qualifying games the position baseline is used at low confidence.
pub fn project(position: Position, past: &[PastGame], baselines: &PositionBaselines) -> ProjectionResult {
    let played: Vec<&PastGame> = past.iter().filter(|g| g.points > 0.0).collect();

    if played.is_empty() {
        return ProjectionResult {
            projected_points: baselines.for_position(position),
            confidence: Confidence::Low,
            basis: ProjectionBasis::PositionAverage,
            games_played: 0,
            stat_projection: None,
        };
    }

    let mean = played.iter().map(|g| g.points).sum::<f64>() / played.len() as f64;

    ProjectionResult {
        projected_points: round2(mean),
        confidence: Confidence::from_games(played.len()),
        basis: ProjectionBasis::PlayoffAverage,
        games_played: played.len(),
        stat_projection: average_stats(played.iter().filter_map(|g| g.stats.as_ref())),
    }
}

/// Mean of each numeric category across the given lines. Categories that are
/// zero in every line are omitted. `None` when there are no lines.
fn average_stats<'a>(lines: impl Iterator<Item = &'a PlayerStats>) -> Option<BTreeMap<String, f64>> {
    // (sum, games reporting the category, occurred as non-zero)
    let mut sums: BTreeMap<&'static str, (f64, usize, bool)> = BTreeMap::new();
    let mut count = 0usize;

    for line in lines {
        count += 1;
        for (key, value) in line.numeric_categories() {
            let entry = sums.entry(key).or_insert((0.0, 0, false));
            entry.0 += value;
            entry.1 += 1;
            entry.2 |= value != 0.0;
        }
    }

    if count == 0 {
        return None;
    }

    Some(
        sums.into_iter()
            .filter(|(_, (_, _, occurred))| *occurred)
            .map(|(key, (sum, n, _))| (key.to_string(), round2(sum / n as f64)))
            .collect(),
    )
}

/// Risk-adjusted value: `projected * win_probability`, rounded to 2 decimals.
/// `None` when no win probability is known.
pub fn expected_value(projected_points: f64, win_probability: Option<f64>) -> Option<f64> {
    win_probability.map(|p| round2(projected_points * p))
}

// ---------------------------------------------------------------------------
// Win probabilities
// ---------------------------------------------------------------------------

/// Team win probabilities keyed by (team, week). Team codes are matched
/// case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct WinProbabilities {
    by_team_week: HashMap<(String, Week), f64>,
}

impl WinProbabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, team: &str, week: Week, probability: f64) {
        self.by_team_week.insert((normalize_team(team), week), probability);
    }

    pub fn get(&self, team: &str, week: Week) -> Option<f64> {
        self.by_team_week.get(&(normalize_team(team), week)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_team_week.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_team_week.is_empty()
    }
}

fn normalize_team(team: &str) -> String {
    team.trim().to_ascii_uppercase()
}

// ---------------------------------------------------------------------------
// Player and roster projections
// ---------------------------------------------------------------------------

/// A projection for one player in one upcoming week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerProjection {
    pub player: Player,
    pub week: Week,
    #[serde(flatten)]
    pub projection: ProjectionResult,
    pub win_probability: Option<f64>,
    pub expected_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotProjection {
    pub slot: RosterSlot,
    #[serde(flatten)]
    pub projection: PlayerProjection,
}

/// Project `player` for `week` from their scores in earlier contest weeks.
pub fn project_player(
    player: &Player,
    week: Week,
    book: &ScoreBook,
    stat_lines: &StatLines,
    weeks: &ContestWeeks,
    baselines: &PositionBaselines,
    win_probabilities: &WinProbabilities,
) -> PlayerProjection {
    let scores = book.weekly(&player.id);
    let past: Vec<PastGame> = weeks
        .iter()
        .filter(|&w| w < week)
        .map(|w| {
            let game = PastGame::new(w, scores.points(w));
            match stat_lines.get(&(player.id.clone(), w)) {
                Some(stats) => game.with_stats(stats.clone()),
                None => game,
            }
        })
        .collect();

    let projection = project(player.position, &past, baselines);
    let win_probability = win_probabilities.get(&player.team, week);
    PlayerProjection {
        player: player.clone(),
        week,
        expected_value: expected_value(projection.projected_points, win_probability),
        projection,
        win_probability,
    }
}

/// Project every slot's effective player for `next_week`, in slot order.
pub fn project_roster(
    roster: &Roster,
    book: &ScoreBook,
    stat_lines: &StatLines,
    next_week: Week,
    weeks: &ContestWeeks,
    baselines: &PositionBaselines,
    win_probabilities: &WinProbabilities,
) -> Vec<SlotProjection> {
    roster
        .effective_entries(next_week)
        .into_iter()
        .map(|(slot, player)| SlotProjection {
            slot,
            projection: project_player(player, next_week, book, stat_lines, weeks, baselines, win_probabilities),
        })
        .collect()
}
