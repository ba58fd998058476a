//! Resolving narrative mentions to registered combatants
//!
//! A mention (an HP figure, a condition word, ...) is attributed to the
//! combatant named in the clause around it. Resolution order:
//! 1. A registered full name appearing in the clause. With several, the one
//!    ending nearest the mention wins, then the longer name, then the earlier
//!    registration.
//! 2. Word-level containment in either direction ("scout" matches
//!    "Goblin Scout", "goblins" matches "Goblin"). The first word with any
//!    candidate decides; among its candidates an exact match wins, then the
//!    longest common substring, then the earlier registration.

/// A registered combatant as seen by the extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub id: String,
    pub name: String,
}

impl RosterEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Words shorter than this never resolve on their own
const MIN_WORD_LEN: usize = 3;

/// Filler words that would otherwise match names by containment
const STOPWORDS: &[&str] = &[
    "and", "are", "but", "for", "from", "has", "her", "him", "his", "its", "now", "she", "the",
    "then", "they", "was", "who", "with",
];

/// Resolve the combatant a clause refers to, if any.
///
/// `roster` must be in registration order.
pub fn resolve<'a>(clause: &str, roster: &'a [RosterEntry]) -> Option<&'a RosterEntry> {
    let clause = clause.to_lowercase();
    if clause.trim().is_empty() {
        return None;
    }

    resolve_full_name(&clause, roster).or_else(|| resolve_by_word(&clause, roster))
}

fn resolve_full_name<'a>(clause: &str, roster: &'a [RosterEntry]) -> Option<&'a RosterEntry> {
    // (end offset, name length, registration index)
    let mut best: Option<(usize, usize, usize)> = None;

    for (index, entry) in roster.iter().enumerate() {
        let name = entry.name.to_lowercase();
        if name.is_empty() {
            continue;
        }
        let Some(end) = last_word_bounded_end(clause, &name) else {
            continue;
        };
        let candidate = (end, name.len(), index);
        best = match best {
            None => Some(candidate),
            Some(current) => {
                let better = candidate.0 > current.0
                    || (candidate.0 == current.0 && candidate.1 > current.1);
                Some(if better { candidate } else { current })
            }
        };
    }

    best.map(|(_, _, index)| &roster[index])
}

/// End offset of the last occurrence of `needle` that sits on word boundaries
fn last_word_bounded_end(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .match_indices(needle)
        .filter(|(start, _)| {
            let end = start + needle.len();
            let before_ok = haystack[..*start]
                .chars()
                .next_back()
                .is_none_or(|c| !c.is_alphanumeric());
            let after_ok = haystack[end..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphanumeric());
            before_ok && after_ok
        })
        .map(|(start, _)| start + needle.len())
        .last()
}

fn resolve_by_word<'a>(clause: &str, roster: &'a [RosterEntry]) -> Option<&'a RosterEntry> {
    let names: Vec<String> = roster.iter().map(|e| e.name.to_lowercase()).collect();

    let words = clause
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| w.chars().count() >= MIN_WORD_LEN && !STOPWORDS.contains(w));

    for word in words {
        // (exact, common length, registration index)
        let mut best: Option<(bool, usize, usize)> = None;

        for (index, name) in names.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let common = if name.contains(word) {
                word.len()
            } else if word.contains(name.as_str()) {
                name.len()
            } else {
                continue;
            };
            let candidate = (name == word, common, index);
            best = match best {
                None => Some(candidate),
                Some(current) => {
                    let better = (candidate.0 && !current.0)
                        || (candidate.0 == current.0 && candidate.1 > current.1);
                    Some(if better { candidate } else { current })
                }
            };
        }

        if let Some((_, _, index)) = best {
            return Some(&roster[index]);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(names: &[&str]) -> Vec<RosterEntry> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| RosterEntry::new(format!("c{}", i), *name))
            .collect()
    }

    #[test]
    fn test_full_name_in_clause() {
        let roster = roster(&["Thoradin", "Goblin Scout"]);
        let hit = resolve("Goblin Scout takes damage, now at ", &roster).unwrap();
        assert_eq!(hit.name, "Goblin Scout");
    }

    #[test]
    fn test_case_insensitive() {
        let roster = roster(&["Thoradin"]);
        assert_eq!(resolve("THORADIN is at ", &roster).unwrap().id, "c0");
    }

    #[test]
    fn test_prefers_longer_name_over_substring_name() {
        let roster = roster(&["Orc", "Orc Warrior"]);
        let hit = resolve("the orc warrior staggers to ", &roster).unwrap();
        assert_eq!(hit.name, "Orc Warrior");
    }

    #[test]
    fn test_prefers_name_nearest_the_mention() {
        let roster = roster(&["Thoradin", "Goblin"]);
        let hit = resolve("Thoradin slashes the goblin, who drops to ", &roster).unwrap();
        assert_eq!(hit.name, "Goblin");
    }

    #[test]
    fn test_word_contained_in_name() {
        let roster = roster(&["Thoradin", "Goblin Scout"]);
        let hit = resolve("The scout is at ", &roster).unwrap();
        assert_eq!(hit.name, "Goblin Scout");
    }

    #[test]
    fn test_name_contained_in_word() {
        let roster = roster(&["Goblin"]);
        let hit = resolve("goblins scatter, one left at ", &roster).unwrap();
        assert_eq!(hit.name, "Goblin");
    }

    #[test]
    fn test_word_ties_fall_back_to_registration_order() {
        let roster = roster(&["Goblin Archer", "Goblin Scout"]);
        let hit = resolve("a goblin yelps at ", &roster).unwrap();
        assert_eq!(hit.name, "Goblin Archer");
    }

    #[test]
    fn test_word_exact_beats_containment() {
        let roster = roster(&["Wolfgang", "Wolf"]);
        let hit = resolve("a wolf howls at ", &roster).unwrap();
        assert_eq!(hit.name, "Wolf");
    }

    #[test]
    fn test_name_inside_longer_word_is_not_a_full_name_hit() {
        let roster = roster(&["Orc", "Sorcerer Vex"]);
        let hit = resolve("the sorcerer is at ", &roster).unwrap();
        assert_eq!(hit.name, "Sorcerer Vex");
    }

    #[test]
    fn test_no_match() {
        let roster = roster(&["Thoradin"]);
        assert!(resolve("The wind howls at ", &roster).is_none());
        assert!(resolve("", &roster).is_none());
        assert!(resolve("anything", &[]).is_none());
    }

    #[test]
    fn test_stopwords_do_not_resolve() {
        let roster = roster(&["Theodric"]);
        assert!(resolve("the door holds at ", &roster).is_none());
    }
}
