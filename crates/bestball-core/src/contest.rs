// Contest calendar: which weeks count toward the playoff contest.

use serde::{Deserialize, Serialize};

/// Playoff week number as used by the stat feed (1 = Wild Card).
pub type Week = u8;

/// Ordered set of scoring weeks for one season.
///
/// The canonical bracket skips week 4 (Pro Bowl), so the default is
/// `[1, 2, 3, 5]`. Other seasons can supply a different list via config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Week>", into = "Vec<Week>")]
pub struct ContestWeeks(Vec<Week>);

impl ContestWeeks {
    pub const STANDARD: [Week; 4] = [1, 2, 3, 5];

    /// Build from a list of weeks. The list must be non-empty and strictly
    /// ascending.
    pub fn new(weeks: Vec<Week>) -> Result<Self, String> {
        if weeks.is_empty() {
            return Err("at least one contest week is required".into());
        }
        if weeks.windows(2).any(|w| w[0] >= w[1]) {
            return Err(format!("weeks must be strictly ascending, got {weeks:?}"));
        }
        Ok(ContestWeeks(weeks))
    }

    pub fn standard() -> Self {
        ContestWeeks(Self::STANDARD.to_vec())
    }

    pub fn as_slice(&self) -> &[Week] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Week> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, week: Week) -> bool {
        self.0.contains(&week)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First contest week strictly after `week`, if any.
    pub fn next_after(&self, week: Week) -> Option<Week> {
        self.iter().find(|&w| w > week)
    }

    /// Round name for display. Counts by position in the list, so a season
    /// without a Pro Bowl gap still labels its final week "Super Bowl".
    pub fn label(&self, week: Week) -> &'static str {
        let Some(idx) = self.0.iter().position(|&w| w == week) else {
            return "Non-contest week";
        };
        if idx + 1 == self.0.len() && self.0.len() > 1 {
            return "Super Bowl";
        }
        match idx {
            0 => "Wild Card",
            1 => "Divisional",
            2 => "Conference",
            _ => "Playoffs",
        }
    }
}

impl Default for ContestWeeks {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<Week>> for ContestWeeks {
    type Error = String;

    fn try_from(weeks: Vec<Week>) -> Result<Self, Self::Error> {
        ContestWeeks::new(weeks)
    }
}

impl From<ContestWeeks> for Vec<Week> {
    fn from(weeks: ContestWeeks) -> Self {
        weeks.0
    }
}
