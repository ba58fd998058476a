//! Combatants tracked inside a session

use std::collections::BTreeSet;

use serde::Serialize;

use super::conditions::Condition;

/// HP fraction at or below which a combatant is bloodied
pub const BLOODIED_THRESHOLD: f64 = 0.5;

/// HP fraction at or below which a combatant is critically wounded
pub const CRITICAL_THRESHOLD: f64 = 0.25;

/// One participant in a combat session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Combatant {
    /// Unique within the session
    pub id: String,
    /// Display name, also used for narrative matching
    pub name: String,
    /// Player character (true) or narrator-controlled enemy (false)
    pub is_player: bool,
    /// Current hit points, if known
    pub current_hp: Option<i32>,
    /// Maximum hit points, if known
    pub max_hp: Option<i32>,
    /// Initiative score; unordered while unset
    pub initiative: Option<i32>,
    /// Accumulated conditions, cleared only when combat ends
    pub conditions: BTreeSet<Condition>,
    /// Free-form position descriptor ("30ft", "cover", ...)
    pub position: Option<String>,
    /// Registration sequence, breaks initiative ties
    #[serde(skip)]
    pub(crate) seq: u64,
}

impl Combatant {
    /// Create a player combatant
    pub fn player(id: &str, name: &str, initiative: i32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            is_player: true,
            current_hp: None,
            max_hp: None,
            initiative: Some(initiative),
            conditions: BTreeSet::new(),
            position: None,
            seq: 0,
        }
    }

    /// Create an enemy combatant with optional starting HP
    pub fn enemy(id: &str, name: &str, initiative: i32, hp: Option<i32>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            is_player: false,
            current_hp: hp,
            max_hp: hp,
            initiative: Some(initiative),
            conditions: BTreeSet::new(),
            position: None,
            seq: 0,
        }
    }

    /// Fraction of max HP remaining, when both values are known
    pub fn hp_fraction(&self) -> Option<f64> {
        match (self.current_hp, self.max_hp) {
            (Some(current), Some(max)) if max > 0 => Some(current as f64 / max as f64),
            _ => None,
        }
    }

    /// Whether the combatant is at 0 HP or below
    pub fn is_down(&self) -> bool {
        self.current_hp.is_some_and(|hp| hp <= 0)
    }

    /// Wound descriptor derived from HP thresholds
    pub fn wound_descriptor(&self) -> Option<&'static str> {
        let fraction = self.hp_fraction()?;
        if fraction <= CRITICAL_THRESHOLD {
            Some("critically wounded")
        } else if fraction <= BLOODIED_THRESHOLD {
            Some("bloodied")
        } else {
            None
        }
    }

    /// Set current HP, adopting it as max HP when max is unknown
    pub fn set_hp(&mut self, hp: i32) {
        self.current_hp = Some(hp);
        if self.max_hp.is_none() {
            self.max_hp = Some(hp);
        }
    }

    /// Status descriptors: conditions, then position, then wound state
    pub fn status(&self) -> Vec<String> {
        let mut status: Vec<String> = self.conditions.iter().map(|c| c.to_string()).collect();
        if let Some(ref position) = self.position {
            status.push(position.clone());
        }
        if let Some(wound) = self.wound_descriptor() {
            status.push(wound.to_string());
        }
        status
    }
}
