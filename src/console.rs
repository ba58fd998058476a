//! Console front end
//!
//! Interprets lines typed at the terminal: lines starting with `/` are
//! commands, anything else is narration for the tracker.

use thiserror::Error;

use crate::combat::InitiativeRoll;
use crate::tracker::{CombatTracker, TrackerUpdate};
use crate::ChannelId;

/// Command usage, shown on errors
pub const USAGE: &str = "\
/player <id> <name> <initiative>
/enemy <name> <initiative> [hp]
/join <id> <name> [modifier]
/start
/next
/end
/context
/status
/whois <name>";

/// Errors from parsing a console line
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: /{0}")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("not a number: {0}")]
    InvalidNumber(String),
}

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Player {
        id: String,
        name: String,
        initiative: i32,
    },
    Enemy {
        name: String,
        initiative: i32,
        hp: Option<i32>,
    },
    Join {
        id: String,
        name: String,
        modifier: i32,
    },
    Start,
    Next,
    End,
    Context,
    Status,
    Whois {
        name: String,
    },
    Narrate(String),
}

impl Command {
    /// Parse one line of input.
    ///
    /// Multi-word names are accepted: numeric arguments are taken from the
    /// end of the line and everything before them is the name.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Command::Narrate(line.to_string()));
        };

        let mut words: Vec<&str> = rest.split_whitespace().collect();
        if words.is_empty() {
            return Err(CommandError::Unknown(String::new()));
        }
        let command = words.remove(0).to_lowercase();

        match command.as_str() {
            "player" => {
                if words.len() < 3 {
                    return Err(CommandError::Usage("/player <id> <name> <initiative>"));
                }
                let initiative = parse_number(words.pop())?;
                let id = words.remove(0).to_string();
                Ok(Command::Player {
                    id,
                    name: words.join(" "),
                    initiative,
                })
            }
            "enemy" => {
                if words.len() < 2 {
                    return Err(CommandError::Usage("/enemy <name> <initiative> [hp]"));
                }
                // With three or more words, two trailing numbers mean initiative and hp
                let trailing_numbers = words
                    .iter()
                    .rev()
                    .take_while(|w| w.parse::<i32>().is_ok())
                    .count();
                let hp = if trailing_numbers >= 2 && words.len() >= 3 {
                    Some(parse_number(words.pop())?)
                } else {
                    None
                };
                let initiative = parse_number(words.pop())?;
                Ok(Command::Enemy {
                    name: words.join(" "),
                    initiative,
                    hp,
                })
            }
            "join" => {
                if words.len() < 2 {
                    return Err(CommandError::Usage("/join <id> <name> [modifier]"));
                }
                let modifier = match words.last() {
                    Some(last) if words.len() >= 3 && last.parse::<i32>().is_ok() => {
                        parse_number(words.pop())?
                    }
                    _ => 0,
                };
                let id = words.remove(0).to_string();
                Ok(Command::Join {
                    id,
                    name: words.join(" "),
                    modifier,
                })
            }
            "whois" => {
                if words.is_empty() {
                    return Err(CommandError::Usage("/whois <name>"));
                }
                Ok(Command::Whois {
                    name: words.join(" "),
                })
            }
            "start" => Ok(Command::Start),
            "next" => Ok(Command::Next),
            "end" => Ok(Command::End),
            "context" => Ok(Command::Context),
            "status" => Ok(Command::Status),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn parse_number(word: Option<&str>) -> Result<i32, CommandError> {
    let word = word.unwrap_or_default();
    word.parse()
        .map_err(|_| CommandError::InvalidNumber(word.to_string()))
}

/// Run a command against the tracker, returning lines to print
pub async fn execute(tracker: &CombatTracker, channel: &ChannelId, command: Command) -> Vec<String> {
    let mut out = Vec::new();

    match command {
        Command::Player {
            id,
            name,
            initiative,
        } => match tracker.add_player(channel, &id, &name, initiative).await {
            Ok(update) => {
                out.push(format!("{} joins with initiative {}", name, initiative));
                push_announcement(&mut out, update);
            }
            Err(e) => out.push(format!("Cannot add {}: {}", name, e)),
        },
        Command::Enemy {
            name,
            initiative,
            hp,
        } => match tracker.add_enemy(channel, &name, initiative, hp).await {
            Ok((id, update)) => {
                out.push(format!("{} ({}) joins with initiative {}", name, id, initiative));
                push_announcement(&mut out, update);
            }
            Err(e) => out.push(format!("Cannot add {}: {}", name, e)),
        },
        Command::Join { id, name, modifier } => {
            match tracker.quick_join(channel, &id, &name, modifier).await {
                Ok((roll, update)) => {
                    out.push(join_line(&name, roll));
                    push_announcement(&mut out, update);
                }
                Err(e) => out.push(format!("Cannot add {}: {}", name, e)),
            }
        }
        Command::Start => {
            let update = tracker.start_combat(channel).await;
            if !update.applied {
                out.push("Combat cannot start".to_string());
            }
            push_announcement(&mut out, update);
        }
        Command::Next => {
            let update = tracker.advance_turn(channel).await;
            if !update.applied {
                out.push("No combat in progress".to_string());
            }
            push_announcement(&mut out, update);
        }
        Command::End => match tracker.end_combat(channel).await {
            Some(summary) => out.push(format!(
                "Combat ended after {} rounds with {} combatants",
                summary.rounds, summary.combatant_count
            )),
            None => out.push("No combat to end".to_string()),
        },
        Command::Context => match tracker.minimal_context(channel).await {
            Some(context) => out.push(context),
            None => out.push("No combat in progress".to_string()),
        },
        Command::Status => {
            let status = serde_json::json!({
                "tracker": tracker.status().await,
                "session": tracker.session_status(channel).await,
            });
            match serde_json::to_string_pretty(&status) {
                Ok(json) => out.push(json),
                Err(e) => out.push(format!("Cannot format status: {}", e)),
            }
        }
        Command::Whois { name } => {
            let status = tracker.character_status(channel, &name).await;
            if status.is_empty() {
                out.push(format!("{}: nothing to report", name));
            } else {
                out.push(format!("{}: {}", name, status.join(", ")));
            }
        }
        Command::Narrate(text) => {
            if text.is_empty() {
                return out;
            }
            let update = tracker.apply_narrative_update(channel, &text).await;
            push_announcement(&mut out, update);
        }
    }

    out
}

fn join_line(name: &str, roll: InitiativeRoll) -> String {
    if roll.is_critical() {
        format!("{} rolls initiative: {} Natural 20!", name, roll)
    } else {
        format!("{} rolls initiative: {}", name, roll)
    }
}

fn push_announcement(out: &mut Vec<String>, update: TrackerUpdate) {
    if let Some(announcement) = update.announcement {
        out.push(announcement.text);
    }
}
