//! Turn announcements
//!
//! Tells the table whose turn it is. Each (round, combatant) pair is
//! announced once, so re-parsing the same narration never repeats a
//! notification.

use serde::Serialize;

use crate::combat::CombatSession;
use crate::ChannelId;

/// Identifies one turn
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TurnKey {
    pub round: u32,
    pub name: String,
}

/// A turn notification for a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub channel_id: ChannelId,
    pub key: TurnKey,
    /// Status reminders for the combatant (conditions, position, wounds)
    pub status: Vec<String>,
    pub text: String,
}

/// Announce the current turn if it has not been announced yet.
///
/// Only active sessions with a current combatant announce.
pub fn announce_turn(session: &mut CombatSession) -> Option<Announcement> {
    if !session.is_active() {
        return None;
    }
    let current = session.current_combatant()?;
    let key = TurnKey {
        round: session.round(),
        name: current.name.clone(),
    };
    if session.last_announced_turn() == Some(&key) {
        return None;
    }

    // By combatant, not by name: enemies may share a name
    let status = current.status();
    let text = if status.is_empty() {
        format!("Round {} - It's {}'s turn!", key.round, key.name)
    } else {
        format!(
            "Round {} - It's {}'s turn! ({})",
            key.round,
            key.name,
            status.join(", ")
        )
    };

    session.set_last_announced_turn(key.clone());
    Some(Announcement {
        channel_id: session.channel_id().clone(),
        key,
        status,
        text,
    })
}
