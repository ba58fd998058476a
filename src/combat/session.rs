//! Per-channel combat session
//!
//! Owns the combatants of one channel and the combat state machine:
//! - Setup -> Active -> Ended, Ended is terminal
//! - Initiative order and turn/round tracking
//! - Applying facts extracted from narration
//!
//! Invalid transitions (advancing with nobody in the order, mutating an ended
//! session) are no-ops rather than errors.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::combatant::Combatant;
use crate::announce::TurnKey;
use crate::extract::{self, Patch, RosterEntry};
use crate::ChannelId;

/// Hard cap on the length of the context handed back to the narrator
pub const MINIMAL_CONTEXT_LIMIT: usize = 200;

/// Largest roster for which the context lists every combatant
pub const CONTEXT_ROSTER_CUTOFF: usize = 4;

/// Round numbers mentioned in narration above this are ignored
pub const MAX_ROUND: u32 = 10_000;

/// Coarse combat lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatPhase {
    Setup,
    Active,
    Ended,
}

impl std::fmt::Display for CombatPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CombatPhase::Setup => "Setup",
            CombatPhase::Active => "Active",
            CombatPhase::Ended => "Ended",
        };
        write!(f, "{}", s)
    }
}

/// Returned when combat ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CombatSummary {
    pub rounds: u32,
    pub combatant_count: usize,
}

/// Rejected roster changes
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("combatant id must not be empty")]
    EmptyId,

    #[error("combatant name must not be empty")]
    EmptyName,

    #[error("combat has already ended")]
    CombatEnded,
}

/// Debug view of a combatant
#[derive(Debug, Clone, Serialize)]
pub struct CombatantStatus {
    pub id: String,
    pub name: String,
    pub initiative: Option<i32>,
    pub is_player: bool,
    pub hp: String,
}

/// Debug view of a whole session
#[derive(Debug, Clone, Serialize)]
pub struct CombatStatus {
    pub channel_id: String,
    pub phase: CombatPhase,
    pub round: u32,
    pub turn_index: usize,
    pub combatant_count: usize,
    pub initiative_order_count: usize,
    pub current_combatant: Option<String>,
    pub combatants: Vec<CombatantStatus>,
}

/// Combat state for one channel
#[derive(Debug, Clone)]
pub struct CombatSession {
    channel_id: ChannelId,
    phase: CombatPhase,
    round: u32,
    turn_index: usize,
    combatants: HashMap<String, Combatant>,
    initiative_order: Vec<String>,
    next_seq: u64,
    /// Set by the first advance; until then the top of the order acts first
    turn_taken: bool,
    last_announced_turn: Option<TurnKey>,
    summary: Option<CombatSummary>,
}

impl CombatSession {
    /// Create an empty session in Setup
    pub fn new(channel_id: ChannelId) -> Self {
        Self {
            channel_id,
            phase: CombatPhase::Setup,
            round: 0,
            turn_index: 0,
            combatants: HashMap::new(),
            initiative_order: Vec::new(),
            next_seq: 0,
            turn_taken: false,
            last_announced_turn: None,
            summary: None,
        }
    }

    pub fn channel_id(&self) -> &ChannelId {
        &self.channel_id
    }

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    /// Combatant ids in turn order
    pub fn initiative_order(&self) -> &[String] {
        &self.initiative_order
    }

    /// Check if combat is active
    pub fn is_active(&self) -> bool {
        self.phase == CombatPhase::Active
    }

    pub fn combatant(&self, id: &str) -> Option<&Combatant> {
        self.combatants.get(id)
    }

    /// Find a combatant by name, ignoring case
    pub fn combatant_by_name(&self, name: &str) -> Option<&Combatant> {
        let name = name.to_lowercase();
        self.combatants_in_registration_order()
            .into_iter()
            .find(|c| c.name.to_lowercase() == name)
    }

    pub fn combatant_count(&self) -> usize {
        self.combatants.len()
    }

    /// Combatants in the order they joined
    pub fn combatants_in_registration_order(&self) -> Vec<&Combatant> {
        let mut all: Vec<&Combatant> = self.combatants.values().collect();
        all.sort_by_key(|c| c.seq);
        all
    }

    /// Names the extractor can attribute facts to
    pub fn roster(&self) -> Vec<RosterEntry> {
        self.combatants_in_registration_order()
            .into_iter()
            .map(|c| RosterEntry::new(c.id.clone(), c.name.clone()))
            .collect()
    }

    /// The combatant whose turn it is
    pub fn current_combatant(&self) -> Option<&Combatant> {
        self.initiative_order
            .get(self.turn_index)
            .and_then(|id| self.combatants.get(id))
    }

    pub fn last_announced_turn(&self) -> Option<&TurnKey> {
        self.last_announced_turn.as_ref()
    }

    pub(crate) fn set_last_announced_turn(&mut self, key: TurnKey) {
        self.last_announced_turn = Some(key);
    }

    /// Summary recorded when combat ended
    pub fn summary(&self) -> Option<CombatSummary> {
        self.summary
    }

    /// Start combat. Requires at least one combatant with initiative.
    pub fn start(&mut self) -> bool {
        if self.phase != CombatPhase::Setup {
            debug!(channel = %self.channel_id, phase = %self.phase, "Combat not in setup, cannot start");
            return false;
        }
        if self.initiative_order.is_empty() {
            debug!(channel = %self.channel_id, "No combatants with initiative, cannot start");
            return false;
        }

        self.phase = CombatPhase::Active;
        if self.round == 0 {
            self.round = 1;
        }
        info!(
            channel = %self.channel_id,
            combatants = self.initiative_order.len(),
            "Combat started"
        );
        true
    }

    /// Add or replace a player combatant
    pub fn add_player(&mut self, id: &str, name: &str, initiative: i32) -> Result<(), RosterError> {
        if self.phase == CombatPhase::Ended {
            return Err(RosterError::CombatEnded);
        }
        if id.trim().is_empty() {
            return Err(RosterError::EmptyId);
        }
        if name.trim().is_empty() {
            return Err(RosterError::EmptyName);
        }

        let mut player = Combatant::player(id, name.trim(), initiative);
        player.seq = match self.combatants.get(id) {
            Some(existing) => existing.seq,
            None => self.take_seq(),
        };
        self.combatants.insert(id.to_string(), player);
        debug!(channel = %self.channel_id, name, initiative, "Player joined combat");

        self.rebuild_initiative_order();
        self.start_if_ready();
        Ok(())
    }

    /// Add an enemy, returning its generated id
    pub fn add_enemy(
        &mut self,
        name: &str,
        initiative: i32,
        hp: Option<i32>,
    ) -> Result<String, RosterError> {
        if self.phase == CombatPhase::Ended {
            return Err(RosterError::CombatEnded);
        }
        if name.trim().is_empty() {
            return Err(RosterError::EmptyName);
        }

        let id = self.next_enemy_id(name);
        let mut enemy = Combatant::enemy(&id, name.trim(), initiative, hp);
        enemy.seq = self.take_seq();
        self.combatants.insert(id.clone(), enemy);
        debug!(channel = %self.channel_id, name, initiative, ?hp, "Enemy joined combat");

        self.rebuild_initiative_order();
        self.start_if_ready();
        Ok(id)
    }

    /// Move to the next combatant, wrapping into a new round
    pub fn advance_turn(&mut self) -> bool {
        if self.phase != CombatPhase::Active || self.initiative_order.is_empty() {
            return false;
        }

        self.turn_taken = true;
        self.turn_index = (self.turn_index + 1) % self.initiative_order.len();
        if self.turn_index == 0 {
            self.round = self.round.saturating_add(1);
            debug!(channel = %self.channel_id, round = self.round, "New round");
        }
        true
    }

    /// Apply a piece of narration.
    ///
    /// Returns true when the text carried a combat signal. Facts are only
    /// applied while combat is active; in setup a start cue begins combat
    /// first.
    pub fn apply(&mut self, text: &str) -> bool {
        if self.phase == CombatPhase::Ended || !extract::detects_combat(text) {
            return false;
        }

        if self.phase == CombatPhase::Setup && extract::has_start_cue(text) && self.start() {
            info!(channel = %self.channel_id, "Combat started from narration");
        }

        if self.phase == CombatPhase::Active {
            let patches = extract::extract(text, &self.roster());
            self.apply_patches(patches);
        }
        true
    }

    /// Apply extracted patches as one update
    pub fn apply_patches(&mut self, patches: Vec<Patch>) {
        if self.phase == CombatPhase::Ended {
            return;
        }

        let mut resort = false;
        for patch in patches {
            match patch {
                Patch::Hp { id, hp } => {
                    if let Some(c) = self.combatants.get_mut(&id) {
                        c.set_hp(hp);
                    }
                }
                Patch::Initiative { id, initiative } => {
                    if let Some(c) = self.combatants.get_mut(&id) {
                        if c.initiative != Some(initiative) {
                            c.initiative = Some(initiative);
                            resort = true;
                        }
                    }
                }
                Patch::Position { id, position } => {
                    if let Some(c) = self.combatants.get_mut(&id) {
                        c.position = Some(position);
                    }
                }
                Patch::Condition { id, condition } => {
                    if let Some(c) = self.combatants.get_mut(&id) {
                        c.conditions.insert(condition);
                    }
                }
                Patch::Round(round) => {
                    // Rounds never go backwards
                    if round > self.round && round <= MAX_ROUND {
                        self.round = round;
                    }
                }
            }
        }

        if resort {
            self.rebuild_initiative_order();
        }
    }

    /// End combat. Idempotent: later calls return the same summary.
    pub fn end_combat(&mut self) -> CombatSummary {
        if let Some(summary) = self.summary {
            return summary;
        }

        let summary = CombatSummary {
            rounds: self.round,
            combatant_count: self.combatants.len(),
        };
        self.phase = CombatPhase::Ended;
        self.summary = Some(summary);
        for combatant in self.combatants.values_mut() {
            combatant.conditions.clear();
        }

        info!(
            channel = %self.channel_id,
            rounds = summary.rounds,
            combatants = summary.combatant_count,
            "Combat ended"
        );
        summary
    }

    /// Short state line for the narrator, at most 200 characters
    pub fn minimal_context(&self) -> String {
        if self.phase != CombatPhase::Active {
            return String::new();
        }
        let Some(current) = self.current_combatant() else {
            return String::new();
        };

        let mut parts = vec![format!("Round {} - {}'s turn", self.round, current.name)];

        if self.combatants.len() <= CONTEXT_ROSTER_CUTOFF {
            let standing: Vec<String> = self
                .initiative_order
                .iter()
                .filter_map(|id| self.combatants.get(id))
                .filter(|c| !c.is_down())
                .map(|c| match c.current_hp {
                    Some(hp) => format!("{}({}hp)", c.name, hp),
                    None => c.name.clone(),
                })
                .collect();

            if !standing.is_empty() {
                parts.push(format!("Active: {}", standing.join(", ")));
            }
        }

        parts
            .join(" | ")
            .chars()
            .take(MINIMAL_CONTEXT_LIMIT)
            .collect()
    }

    /// Conditions, position and wound state of a combatant
    pub fn character_status(&self, name: &str) -> Vec<String> {
        self.combatant_by_name(name)
            .map(|c| c.status())
            .unwrap_or_default()
    }

    /// Debug snapshot of the session
    pub fn status(&self) -> CombatStatus {
        CombatStatus {
            channel_id: self.channel_id.to_string(),
            phase: self.phase,
            round: self.round,
            turn_index: self.turn_index,
            combatant_count: self.combatants.len(),
            initiative_order_count: self.initiative_order.len(),
            current_combatant: self.current_combatant().map(|c| c.name.clone()),
            combatants: self
                .combatants_in_registration_order()
                .into_iter()
                .map(|c| CombatantStatus {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    initiative: c.initiative,
                    is_player: c.is_player,
                    hp: match (c.current_hp, c.max_hp) {
                        (Some(current), Some(max)) => format!("{}/{}", current, max),
                        (Some(current), None) => current.to_string(),
                        _ => "Unknown".to_string(),
                    },
                })
                .collect(),
        }
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn start_if_ready(&mut self) {
        if self.phase == CombatPhase::Setup && !self.initiative_order.is_empty() {
            self.start();
        }
    }

    fn next_enemy_id(&self, name: &str) -> String {
        let slug: String = name
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        let mut n = self.combatants.values().filter(|c| !c.is_player).count();
        loop {
            let id = format!("enemy_{}_{}", slug, n);
            if !self.combatants.contains_key(&id) {
                return id;
            }
            n += 1;
        }
    }

    /// Re-sort by initiative (descending, ties by registration). Once turns
    /// have started moving the current combatant keeps the turn; before that
    /// the turn goes to the top of the new order.
    fn rebuild_initiative_order(&mut self) {
        let current = if self.turn_taken {
            self.initiative_order.get(self.turn_index).cloned()
        } else {
            None
        };

        let mut ordered: Vec<&Combatant> = self
            .combatants
            .values()
            .filter(|c| c.initiative.is_some())
            .collect();
        ordered.sort_by(|a, b| b.initiative.cmp(&a.initiative).then(a.seq.cmp(&b.seq)));
        self.initiative_order = ordered.into_iter().map(|c| c.id.clone()).collect();

        self.turn_index = current
            .and_then(|id| self.initiative_order.iter().position(|o| *o == id))
            .unwrap_or(0);
        if self.turn_index >= self.initiative_order.len() {
            self.turn_index = 0;
        }
    }
}
