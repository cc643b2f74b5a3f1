// Normalized per-game stat lines, as handed over by the stat-ingestion side.

use serde::{Deserialize, Serialize};

/// A single field-goal attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldGoal {
    /// Kick distance in yards.
    pub distance: u32,
    pub made: bool,
}

impl FieldGoal {
    pub fn made(distance: u32) -> Self {
        FieldGoal { distance, made: true }
    }

    pub fn missed(distance: u32) -> Self {
        FieldGoal { distance, made: false }
    }
}

/// Distance buckets for made field goals, as `(rule key, min, max)` with both
/// bounds inclusive. The last bucket is open-ended.
pub const FG_BUCKETS: [(&str, u32, u32); 5] = [
    ("fg_0_19", 0, 19),
    ("fg_20_29", 20, 29),
    ("fg_30_39", 30, 39),
    ("fg_40_49", 40, 49),
    ("fg_50_plus", 50, u32::MAX),
];

/// Rule key of the bucket a made kick of `distance` yards falls into.
pub fn fg_bucket(distance: u32) -> &'static str {
    FG_BUCKETS
        .iter()
        .find(|(_, lo, hi)| (*lo..=*hi).contains(&distance))
        .map(|(key, _, _)| *key)
        .unwrap_or("fg_50_plus")
}

/// One player's statistics for one game.
///
/// Yardage is signed (sacks and losses can push it below zero); every other
/// field is a non-negative count. Offensive and defensive fields share one
/// struct so a single row shape covers every position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    // Passing
    pub pass_yards: i32,
    pub pass_td: u32,
    pub pass_int: u32,
    // Rushing
    pub rush_yards: i32,
    pub rush_td: u32,
    // Receiving
    pub receptions: u32,
    pub rec_yards: i32,
    pub rec_td: u32,
    // Shared offense
    pub two_pt_conv: u32,
    pub fumbles_lost: u32,
    pub return_td: u32,
    // Kicking
    pub field_goals: Vec<FieldGoal>,
    pub xp_made: u32,
    pub xp_missed: u32,
    // Defense / special teams
    pub sacks: u32,
    pub def_int: u32,
    pub fumbles_recovered: u32,
    pub def_td: u32,
    pub safeties: u32,
    pub blocked_kicks: u32,
    /// `None` when the feed did not report it. A DST line without it earns
    /// no points-allowed tier bonus.
    pub points_allowed: Option<u32>,
}

impl PlayerStats {
    pub fn fg_made(&self) -> impl Iterator<Item = &FieldGoal> {
        self.field_goals.iter().filter(|fg| fg.made)
    }

    pub fn fg_missed_count(&self) -> u32 {
        self.field_goals.iter().filter(|fg| !fg.made).count() as u32
    }

    /// Made field goals in the bucket identified by `key`.
    pub fn fg_made_in_bucket(&self, key: &str) -> u32 {
        self.fg_made().filter(|fg| fg_bucket(fg.distance) == key).count() as u32
    }

    /// Flatten this line into `(category, value)` pairs for averaging.
    ///
    /// Field goals become one made-count per distance bucket plus a single
    /// missed count. Zero-valued categories are included; callers filter.
    /// Points allowed appears only when it was reported.
    pub fn numeric_categories(&self) -> Vec<(&'static str, f64)> {
        let mut out = vec![
            ("pass_yards", self.pass_yards as f64),
            ("pass_td", self.pass_td as f64),
            ("pass_int", self.pass_int as f64),
            ("rush_yards", self.rush_yards as f64),
            ("rush_td", self.rush_td as f64),
            ("receptions", self.receptions as f64),
            ("rec_yards", self.rec_yards as f64),
            ("rec_td", self.rec_td as f64),
            ("two_pt_conv", self.two_pt_conv as f64),
            ("fumbles_lost", self.fumbles_lost as f64),
            ("return_td", self.return_td as f64),
        ];
        for (key, _, _) in FG_BUCKETS {
            out.push((key, self.fg_made_in_bucket(key) as f64));
        }
        out.extend([
            ("fg_missed", self.fg_missed_count() as f64),
            ("xp_made", self.xp_made as f64),
            ("xp_missed", self.xp_missed as f64),
            ("sacks", self.sacks as f64),
            ("def_int", self.def_int as f64),
            ("fumbles_recovered", self.fumbles_recovered as f64),
            ("def_td", self.def_td as f64),
            ("safeties", self.safeties as f64),
            ("blocked_kicks", self.blocked_kicks as f64),
        ]);
        if let Some(allowed) = self.points_allowed {
            out.push(("points_allowed", allowed as f64));
        }
        out
    }
}
