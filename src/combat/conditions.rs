//! Condition and position vocabulary
//!
//! The narrator describes status effects and battlefield placement in prose.
//! Only a fixed vocabulary is recognised:
//! - Conditions (poisoned, stunned, prone, ...)
//! - Descriptive positions (behind cover, in melee, high ground, ...)

use serde::{Deserialize, Serialize};

/// Status conditions a combatant can accumulate during combat
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Poisoned,
    Charmed,
    Frightened,
    Paralyzed,
    Stunned,
    Prone,
    Restrained,
    Grappled,
    Blinded,
    Deafened,
    Exhausted,
    Incapacitated,
    Unconscious,
}

impl Condition {
    /// Every recognised condition, in scan order
    pub const ALL: [Condition; 13] = [
        Condition::Poisoned,
        Condition::Charmed,
        Condition::Frightened,
        Condition::Paralyzed,
        Condition::Stunned,
        Condition::Prone,
        Condition::Restrained,
        Condition::Grappled,
        Condition::Blinded,
        Condition::Deafened,
        Condition::Exhausted,
        Condition::Incapacitated,
        Condition::Unconscious,
    ];

    /// The word the narrator uses for this condition
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Poisoned => "poisoned",
            Condition::Charmed => "charmed",
            Condition::Frightened => "frightened",
            Condition::Paralyzed => "paralyzed",
            Condition::Stunned => "stunned",
            Condition::Prone => "prone",
            Condition::Restrained => "restrained",
            Condition::Grappled => "grappled",
            Condition::Blinded => "blinded",
            Condition::Deafened => "deafened",
            Condition::Exhausted => "exhausted",
            Condition::Incapacitated => "incapacitated",
            Condition::Unconscious => "unconscious",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Descriptive battlefield positions: (phrase in narration, stored descriptor)
pub const POSITION_PHRASES: [(&str, &str); 9] = [
    ("behind cover", "cover"),
    ("in melee", "melee"),
    ("at range", "ranged"),
    ("prone", "prone"),
    ("standing", "standing"),
    ("crouched", "crouched"),
    ("elevated", "elevated"),
    ("high ground", "high ground"),
    ("low ground", "low ground"),
];

/// Format a distance mention as a position descriptor
pub fn distance_position(feet: u32) -> String {
    format!("{}ft", feet)
}
