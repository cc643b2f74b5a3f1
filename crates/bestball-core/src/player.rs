// Player identity, fantasy positions and roster slots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fantasy-football positions. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    K,
    DST,
}

impl Position {
    pub const ALL: [Position; 6] = [
        Position::QB,
        Position::RB,
        Position::WR,
        Position::TE,
        Position::K,
        Position::DST,
    ];

    /// Parse a position string into a Position enum.
    ///
    /// Case-insensitive. Accepts the common feed aliases:
    /// "PK" -> K, "D/ST" / "DEF" / "D" -> DST.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::QB),
            "RB" => Some(Position::RB),
            "WR" => Some(Position::WR),
            "TE" => Some(Position::TE),
            "K" | "PK" => Some(Position::K),
            "DST" | "D/ST" | "DEF" | "D" => Some(Position::DST),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::K => "K",
            Position::DST => "DST",
        }
    }

    /// Whether a player at this position may start in the FLEX slot.
    pub fn is_flex_eligible(&self) -> bool {
        matches!(self, Position::RB | Position::WR | Position::TE)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// The nine slots of a best-ball roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RosterSlot {
    QB,
    RB1,
    RB2,
    WR1,
    WR2,
    TE,
    FLEX,
    K,
    DST,
}

impl RosterSlot {
    /// All slots in display order.
    pub const ALL: [RosterSlot; 9] = [
        RosterSlot::QB,
        RosterSlot::RB1,
        RosterSlot::RB2,
        RosterSlot::WR1,
        RosterSlot::WR2,
        RosterSlot::TE,
        RosterSlot::FLEX,
        RosterSlot::K,
        RosterSlot::DST,
    ];

    pub fn from_str_slot(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(RosterSlot::QB),
            "RB1" => Some(RosterSlot::RB1),
            "RB2" => Some(RosterSlot::RB2),
            "WR1" => Some(RosterSlot::WR1),
            "WR2" => Some(RosterSlot::WR2),
            "TE" => Some(RosterSlot::TE),
            "FLEX" => Some(RosterSlot::FLEX),
            "K" => Some(RosterSlot::K),
            "DST" | "D/ST" | "DEF" => Some(RosterSlot::DST),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            RosterSlot::QB => "QB",
            RosterSlot::RB1 => "RB1",
            RosterSlot::RB2 => "RB2",
            RosterSlot::WR1 => "WR1",
            RosterSlot::WR2 => "WR2",
            RosterSlot::TE => "TE",
            RosterSlot::FLEX => "FLEX",
            RosterSlot::K => "K",
            RosterSlot::DST => "DST",
        }
    }

    /// The single position this slot requires, or `None` for FLEX.
    pub fn required_position(&self) -> Option<Position> {
        match self {
            RosterSlot::QB => Some(Position::QB),
            RosterSlot::RB1 | RosterSlot::RB2 => Some(Position::RB),
            RosterSlot::WR1 | RosterSlot::WR2 => Some(Position::WR),
            RosterSlot::TE => Some(Position::TE),
            RosterSlot::K => Some(Position::K),
            RosterSlot::DST => Some(Position::DST),
            RosterSlot::FLEX => None,
        }
    }

    /// Whether a player at `position` is eligible for this slot.
    pub fn accepts(&self, position: Position) -> bool {
        match self.required_position() {
            Some(required) => required == position,
            None => position.is_flex_eligible(),
        }
    }
}

impl fmt::Display for RosterSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Stable player identifier as issued by the stat-ingestion side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        PlayerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A rosterable player (or, for DST, a team defense).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    /// NFL team abbreviation, e.g. "KC". Used to look up win probabilities.
    #[serde(default)]
    pub team: String,
}

impl Player {
    pub fn new(id: &str, name: &str, position: Position, team: &str) -> Self {
        Player {
            id: PlayerId::new(id),
            name: name.to_string(),
            position,
            team: team.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_pos_standard_positions() {
        assert_eq!(Position::from_str_pos("QB"), Some(Position::QB));
        assert_eq!(Position::from_str_pos("RB"), Some(Position::RB));
        assert_eq!(Position::from_str_pos("WR"), Some(Position::WR));
        assert_eq!(Position::from_str_pos("TE"), Some(Position::TE));
        assert_eq!(Position::from_str_pos("K"), Some(Position::K));
        assert_eq!(Position::from_str_pos("DST"), Some(Position::DST));
    }

    #[test]
    fn from_str_pos_aliases_and_case() {
        assert_eq!(Position::from_str_pos("pk"), Some(Position::K));
        assert_eq!(Position::from_str_pos("D/ST"), Some(Position::DST));
        assert_eq!(Position::from_str_pos("def"), Some(Position::DST));
        assert_eq!(Position::from_str_pos(" wr "), Some(Position::WR));
    }

    #[test]
    fn from_str_pos_invalid() {
        assert_eq!(Position::from_str_pos("FB"), None);
        assert_eq!(Position::from_str_pos(""), None);
        assert_eq!(Position::from_str_pos("FLEX"), None);
    }

    #[test]
    fn position_display_roundtrip() {
        for pos in Position::ALL {
            assert_eq!(Position::from_str_pos(pos.display_str()), Some(pos));
        }
    }

    #[test]
    fn slot_display_roundtrip() {
        for slot in RosterSlot::ALL {
            assert_eq!(RosterSlot::from_str_slot(&slot.to_string()), Some(slot));
        }
    }

    #[test]
    fn flex_accepts_only_rb_wr_te() {
        assert!(RosterSlot::FLEX.accepts(Position::RB));
        assert!(RosterSlot::FLEX.accepts(Position::WR));
        assert!(RosterSlot::FLEX.accepts(Position::TE));
        assert!(!RosterSlot::FLEX.accepts(Position::QB));
        assert!(!RosterSlot::FLEX.accepts(Position::K));
        assert!(!RosterSlot::FLEX.accepts(Position::DST));
    }

    #[test]
    fn dedicated_slots_require_exact_position() {
        assert!(RosterSlot::RB1.accepts(Position::RB));
        assert!(RosterSlot::RB2.accepts(Position::RB));
        assert!(!RosterSlot::RB1.accepts(Position::WR));
        assert!(RosterSlot::WR2.accepts(Position::WR));
        assert!(!RosterSlot::TE.accepts(Position::WR));
        assert!(RosterSlot::DST.accepts(Position::DST));
        assert_eq!(RosterSlot::FLEX.required_position(), None);
        assert_eq!(RosterSlot::QB.required_position(), Some(Position::QB));
    }
}
