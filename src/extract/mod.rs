//! Fact extraction from narrative text
//!
//! Turns free-form narration into candidate state patches:
//! - HP figures ("the goblin is down to 3 hp")
//! - Initiative scores ("Thoradin rolls initiative: 17")
//! - Positions (distances and a fixed set of descriptive placements)
//! - Conditions (a fixed status-effect vocabulary)
//! - Explicit round numbers ("Round 3 begins")
//!
//! Extraction is heuristic and best-effort. It never fails: text without
//! recognisable facts yields an empty patch list.

mod names;

use std::sync::LazyLock;

use regex::Regex;

use crate::combat::{distance_position, Condition, POSITION_PHRASES};

pub use names::{resolve, RosterEntry};

/// Words whose presence marks text as combat-relevant
pub const COMBAT_KEYWORDS: [&str; 8] = [
    "initiative",
    "combat",
    "attack",
    "round",
    "turn",
    "damage",
    "hp",
    "roll",
];

static HP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*(?:hp|hit\s+points?)\b").unwrap());

static INITIATIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\binitiative\b[^\d.!?;\n]*?(\d+)").unwrap());

static DISTANCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*(?:feet|foot|ft)\b").unwrap());

static ROUND_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bround\s*(\d+)").unwrap());

static POSITION_RES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    POSITION_PHRASES
        .iter()
        .map(|(phrase, descriptor)| {
            let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(phrase))).unwrap();
            (re, *descriptor)
        })
        .collect()
});

static CONDITION_RES: LazyLock<Vec<(Regex, Condition)>> = LazyLock::new(|| {
    Condition::ALL
        .iter()
        .map(|condition| {
            let re = Regex::new(&format!(r"(?i)\b{}\b", condition.as_str())).unwrap();
            (re, *condition)
        })
        .collect()
});

/// A single fact to apply to a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Overwrite current HP
    Hp { id: String, hp: i32 },
    /// Overwrite initiative (re-sorts the order)
    Initiative { id: String, initiative: i32 },
    /// Overwrite position
    Position { id: String, position: String },
    /// Add a condition
    Condition { id: String, condition: Condition },
    /// Explicit round number
    Round(u32),
}

/// Cheap pre-filter: does the text look combat-relevant at all?
pub fn detects_combat(text: &str) -> bool {
    let lower = text.to_lowercase();
    COMBAT_KEYWORDS.iter().any(|word| lower.contains(word))
}

/// Does the text announce the start of combat?
pub fn has_start_cue(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("initiative") || lower.contains("combat begins")
}

/// Extract patches from narration, attributing them to `roster` entries.
///
/// Patches are returned in the order their mentions appear in the text, so
/// applying them in sequence makes the last mention win.
pub fn extract(text: &str, roster: &[RosterEntry]) -> Vec<Patch> {
    let mut found: Vec<(usize, Patch)> = Vec::new();

    // HP figures: each clause starts after the previous figure
    let mut floor = 0;
    for caps in HP_RE.captures_iter(text) {
        let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if let (Ok(hp), Some(entry)) = (
            number.as_str().parse::<i32>(),
            resolve_near(text, whole.start(), whole.end(), floor, roster),
        ) {
            found.push((whole.start(), Patch::Hp { id: entry.id.clone(), hp }));
        }
        floor = whole.end();
    }

    for caps in INITIATIVE_RE.captures_iter(text) {
        let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if let (Ok(initiative), Some(entry)) = (
            number.as_str().parse::<i32>(),
            resolve_near(text, whole.start(), whole.end(), 0, roster),
        ) {
            found.push((
                whole.start(),
                Patch::Initiative {
                    id: entry.id.clone(),
                    initiative,
                },
            ));
        }
    }

    for caps in DISTANCE_RE.captures_iter(text) {
        let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if let (Ok(feet), Some(entry)) = (
            number.as_str().parse::<u32>(),
            resolve_near(text, whole.start(), whole.end(), 0, roster),
        ) {
            found.push((
                whole.start(),
                Patch::Position {
                    id: entry.id.clone(),
                    position: distance_position(feet),
                },
            ));
        }
    }

    for (re, descriptor) in POSITION_RES.iter() {
        for m in re.find_iter(text) {
            if let Some(entry) = resolve_near(text, m.start(), m.end(), 0, roster) {
                found.push((
                    m.start(),
                    Patch::Position {
                        id: entry.id.clone(),
                        position: descriptor.to_string(),
                    },
                ));
            }
        }
    }

    for (re, condition) in CONDITION_RES.iter() {
        for m in re.find_iter(text) {
            if let Some(entry) = resolve_near(text, m.start(), m.end(), 0, roster) {
                found.push((
                    m.start(),
                    Patch::Condition {
                        id: entry.id.clone(),
                        condition: *condition,
                    },
                ));
            }
        }
    }

    for caps in ROUND_RE.captures_iter(text) {
        let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if let Ok(round) = number.as_str().parse::<u32>() {
            found.push((whole.start(), Patch::Round(round)));
        }
    }

    found.sort_by_key(|(offset, _)| *offset);
    found.into_iter().map(|(_, patch)| patch).collect()
}

fn is_sentence_break(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | ';' | '\n')
}

/// Resolve the combatant a mention at `start..end` refers to: first the
/// clause leading up to it (never reaching back past `floor`), then the rest
/// of its sentence.
fn resolve_near<'a>(
    text: &str,
    start: usize,
    end: usize,
    floor: usize,
    roster: &'a [RosterEntry],
) -> Option<&'a RosterEntry> {
    let clause_start = text[..start]
        .rfind(is_sentence_break)
        .map(|i| i + 1)
        .unwrap_or(0)
        .max(floor.min(start));
    if let Some(entry) = resolve(&text[clause_start..start], roster) {
        return Some(entry);
    }

    let rest = &text[end..];
    let clause_end = rest.find(is_sentence_break).unwrap_or(rest.len());
    resolve(&rest[..clause_end], roster)
}
