// Library root: domain types, scoring rules and configuration shared by the
// scoring engine and the command-line app.

pub mod config;
pub mod contest;
pub mod player;
pub mod roster;
pub mod rules;
pub mod scores;
pub mod stats;

pub use contest::{ContestWeeks, Week};
pub use player::{Player, PlayerId, Position, RosterSlot};
pub use roster::{Roster, RosterError, Substitution};
pub use rules::{ScoringError, ScoringRules};
pub use scores::{round2, PlayerScore, ScoreBook, WeeklyScores};
pub use stats::{FieldGoal, PlayerStats};
