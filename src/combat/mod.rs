//! Combat tracking module
//!
//! Tracks a narrated combat encounter per channel:
//! - Combatants with HP, initiative, conditions and position
//! - Initiative order, turns and rounds
//! - Setup/Active/Ended lifecycle
//! - Initiative rolls for players joining mid-fight

mod combatant;
mod conditions;
mod dice;
mod session;

pub use combatant::{Combatant, BLOODIED_THRESHOLD, CRITICAL_THRESHOLD};
pub use conditions::{distance_position, Condition, POSITION_PHRASES};
pub use dice::{roll_d20, InitiativeRoll};
pub use session::{
    CombatPhase, CombatSession, CombatStatus, CombatSummary, CombatantStatus, RosterError,
    CONTEXT_ROSTER_CUTOFF, MAX_ROUND, MINIMAL_CONTEXT_LIMIT,
};
