// Contest rosters and injury/substitution overrides.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contest::{ContestWeeks, Week};
use crate::player::{Player, PlayerId, Position, RosterSlot};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RosterError {
    #[error("slot {0} is assigned more than once")]
    DuplicateSlot(RosterSlot),

    #[error("slot {0} has no player")]
    MissingSlot(RosterSlot),

    #[error("player {0} appears on the roster more than once")]
    DuplicatePlayer(PlayerId),

    #[error("{player} ({position}) is not eligible for slot {slot}")]
    IneligiblePlayer {
        player: String,
        position: Position,
        slot: RosterSlot,
    },

    #[error("substitute {substitute} ({substitute_position}) cannot replace a {original_position} in slot {slot}")]
    IncompatibleSubstitute {
        substitute: String,
        substitute_position: Position,
        original_position: Position,
        slot: RosterSlot,
    },

    #[error("roster for {owner} already has a substitution in slot {slot}")]
    AlreadySubstituted { owner: String, slot: RosterSlot },

    #[error("substitution names {named} as the original in slot {slot}, but the roster has {actual}")]
    OriginalMismatch {
        slot: RosterSlot,
        named: PlayerId,
        actual: PlayerId,
    },

    #[error("effective week {0} is not a contest week")]
    InvalidEffectiveWeek(Week),
}

/// Replacement of one rostered player from `effective_week` onward.
///
/// Never amended in place: clear it from the roster and create a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Substitution {
    slot: RosterSlot,
    original: Player,
    substitute: Player,
    effective_week: Week,
    reason: Option<String>,
}

impl Substitution {
    /// Create a substitution, checking position compatibility.
    ///
    /// The substitute must play the original's position, or the slot must be
    /// FLEX and the substitute RB/WR/TE.
    pub fn new(
        slot: RosterSlot,
        original: Player,
        substitute: Player,
        effective_week: Week,
        reason: Option<String>,
    ) -> Result<Self, RosterError> {
        if original.id == substitute.id {
            return Err(RosterError::DuplicatePlayer(substitute.id));
        }
        let compatible = substitute.position == original.position
            || (slot == RosterSlot::FLEX && substitute.position.is_flex_eligible());
        if !compatible {
            return Err(RosterError::IncompatibleSubstitute {
                substitute: substitute.name,
                substitute_position: substitute.position,
                original_position: original.position,
                slot,
            });
        }
        Ok(Substitution {
            slot,
            original,
            substitute,
            effective_week,
            reason: reason.filter(|r| !r.trim().is_empty()),
        })
    }

    pub fn slot(&self) -> RosterSlot {
        self.slot
    }

    pub fn original(&self) -> &Player {
        &self.original
    }

    pub fn substitute(&self) -> &Player {
        &self.substitute
    }

    /// First week the substitute's points count.
    pub fn effective_week(&self) -> Week {
        self.effective_week
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Whether the substitute is the one scoring in `week`.
    pub fn applies_in(&self, week: Week) -> bool {
        week >= self.effective_week
    }
}

/// A player assigned to a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub slot: RosterSlot,
    pub player: Player,
}

/// One owner's nine-player roster for one contest year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Roster {
    pub owner: String,
    pub year: u16,
    entries: Vec<RosterEntry>,
    substitution: Option<Substitution>,
}

impl Roster {
    /// Build a roster from exactly one player per slot.
    ///
    /// Entries are stored in slot display order regardless of input order.
    pub fn new(
        owner: &str,
        year: u16,
        assignments: Vec<(RosterSlot, Player)>,
    ) -> Result<Self, RosterError> {
        let mut seen_slots = HashSet::new();
        let mut seen_players = HashSet::new();
        let mut entries = Vec::with_capacity(assignments.len());

        for (slot, player) in assignments {
            if !seen_slots.insert(slot) {
                return Err(RosterError::DuplicateSlot(slot));
            }
            if !seen_players.insert(player.id.clone()) {
                return Err(RosterError::DuplicatePlayer(player.id));
            }
            if !slot.accepts(player.position) {
                return Err(RosterError::IneligiblePlayer {
                    player: player.name,
                    position: player.position,
                    slot,
                });
            }
            entries.push(RosterEntry { slot, player });
        }

        if let Some(missing) = RosterSlot::ALL.iter().find(|s| !seen_slots.contains(*s)) {
            return Err(RosterError::MissingSlot(*missing));
        }

        entries.sort_by_key(|e| e.slot);

        Ok(Roster {
            owner: owner.to_string(),
            year,
            entries,
            substitution: None,
        })
    }

    /// Entries in slot display order, showing the original players.
    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    /// The originally drafted player in `slot`.
    pub fn player(&self, slot: RosterSlot) -> &Player {
        // Roster::new guarantees one entry per slot, sorted in declaration order.
        &self.entries[slot as usize].player
    }

    pub fn substitution(&self) -> Option<&Substitution> {
        self.substitution.as_ref()
    }

    /// Attach the roster's single substitution.
    pub fn set_substitution(
        &mut self,
        substitution: Substitution,
        weeks: &ContestWeeks,
    ) -> Result<(), RosterError> {
        if let Some(existing) = &self.substitution {
            return Err(RosterError::AlreadySubstituted {
                owner: self.owner.clone(),
                slot: existing.slot,
            });
        }
        let actual = &self.player(substitution.slot).id;
        if *actual != substitution.original.id {
            return Err(RosterError::OriginalMismatch {
                slot: substitution.slot,
                named: substitution.original.id.clone(),
                actual: actual.clone(),
            });
        }
        if !weeks.contains(substitution.effective_week) {
            return Err(RosterError::InvalidEffectiveWeek(substitution.effective_week));
        }
        if self
            .entries
            .iter()
            .any(|e| e.player.id == substitution.substitute.id)
        {
            return Err(RosterError::DuplicatePlayer(substitution.substitute.id.clone()));
        }
        self.substitution = Some(substitution);
        Ok(())
    }

    /// Remove the substitution, reverting every week to the original player.
    pub fn clear_substitution(&mut self) -> Option<Substitution> {
        self.substitution.take()
    }

    /// The player whose points count for `slot` in `week`.
    pub fn effective_player(&self, slot: RosterSlot, week: Week) -> &Player {
        match &self.substitution {
            Some(sub) if sub.slot == slot && sub.applies_in(week) => &sub.substitute,
            _ => self.player(slot),
        }
    }

    /// Every slot with its effective player for `week`, in slot order.
    pub fn effective_entries(&self, week: Week) -> Vec<(RosterSlot, &Player)> {
        self.entries
            .iter()
            .map(|e| (e.slot, self.effective_player(e.slot, week)))
            .collect()
    }
}
