//! Combat tracker
//!
//! The orchestrator-facing API. Each call locks the channel's session, runs a
//! short state transition, snapshots the result for the display queue and
//! returns any turn announcement to the caller. Nothing here waits on the
//! publisher.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::announce::{announce_turn, Announcement};
use crate::combat::{
    CombatPhase, CombatSession, CombatStatus, CombatSummary, InitiativeRoll, RosterError,
};
use crate::display::DisplayUpdateQueue;
use crate::store::SessionStore;
use crate::ChannelId;

/// Result of a tracker call that may change state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerUpdate {
    /// Whether the call took effect
    pub applied: bool,
    /// Turn announcement to relay to the channel
    pub announcement: Option<Announcement>,
}

/// Counts across all channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrackerStatus {
    pub sessions: usize,
    pub active: usize,
}

/// Tracks combat for any number of channels
#[derive(Debug, Clone)]
pub struct CombatTracker {
    store: Arc<SessionStore>,
    display: DisplayUpdateQueue,
}

impl CombatTracker {
    pub fn new(store: Arc<SessionStore>, display: DisplayUpdateQueue) -> Self {
        Self { store, display }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Apply a piece of narration to the channel's session.
    ///
    /// Channels without a session are left alone: narration never creates one.
    pub async fn apply_narrative_update(&self, channel: &ChannelId, text: &str) -> TrackerUpdate {
        let Some(session) = self.store.get(channel).await else {
            return TrackerUpdate::default();
        };
        let mut session = session.lock().await;

        let applied = session.apply(text);
        if !applied {
            return TrackerUpdate::default();
        }
        debug!(%channel, phase = %session.phase(), "Narration applied");
        if session.is_active() {
            self.queue_display_update(channel, &session);
        }
        TrackerUpdate {
            applied,
            announcement: announce_turn(&mut session),
        }
    }

    /// Add or replace a player
    pub async fn add_player(
        &self,
        channel: &ChannelId,
        id: &str,
        name: &str,
        initiative: i32,
    ) -> Result<TrackerUpdate, RosterError> {
        let session = self.store.session(channel).await;
        let mut session = session.lock().await;

        session.add_player(id, name, initiative)?;
        Ok(self.after_change(channel, &mut session))
    }

    /// Add an enemy, returning its generated id
    pub async fn add_enemy(
        &self,
        channel: &ChannelId,
        name: &str,
        initiative: i32,
        hp: Option<i32>,
    ) -> Result<(String, TrackerUpdate), RosterError> {
        let session = self.store.session(channel).await;
        let mut session = session.lock().await;

        let id = session.add_enemy(name, initiative, hp)?;
        Ok((id, self.after_change(channel, &mut session)))
    }

    /// Add a player with a freshly rolled initiative (d20 + modifier)
    pub async fn quick_join(
        &self,
        channel: &ChannelId,
        id: &str,
        name: &str,
        modifier: i32,
    ) -> Result<(InitiativeRoll, TrackerUpdate), RosterError> {
        let roll = InitiativeRoll::roll(modifier);
        let update = self.add_player(channel, id, name, roll.total()).await?;
        info!(%channel, name, %roll, "Quick join");
        Ok((roll, update))
    }

    /// Start combat explicitly
    pub async fn start_combat(&self, channel: &ChannelId) -> TrackerUpdate {
        let Some(session) = self.store.get(channel).await else {
            return TrackerUpdate::default();
        };
        let mut session = session.lock().await;

        if !session.start() {
            return TrackerUpdate::default();
        }
        self.after_change(channel, &mut session)
    }

    /// Move to the next turn
    pub async fn advance_turn(&self, channel: &ChannelId) -> TrackerUpdate {
        let Some(session) = self.store.get(channel).await else {
            return TrackerUpdate::default();
        };
        let mut session = session.lock().await;

        if !session.advance_turn() {
            return TrackerUpdate::default();
        }
        self.after_change(channel, &mut session)
    }

    /// End combat and release the channel's session.
    ///
    /// Returns None when the channel had no session. The conclusion is queued
    /// and the session released under its lock, so a session created for the
    /// next fight is always displayed after the conclusion.
    pub async fn end_combat(&self, channel: &ChannelId) -> Option<CombatSummary> {
        let shared = self.store.get(channel).await?;
        let mut session = shared.lock().await;
        if session.phase() == CombatPhase::Ended {
            return None;
        }

        let summary = session.end_combat();
        self.display.conclude(channel.clone(), summary);
        self.store.remove(channel).await;
        Some(summary)
    }

    /// Short state line for the narrator while combat is active
    pub async fn minimal_context(&self, channel: &ChannelId) -> Option<String> {
        let session = self.store.get(channel).await?;
        let session = session.lock().await;
        if !session.is_active() {
            return None;
        }
        Some(session.minimal_context())
    }

    /// Status reminders for a combatant
    pub async fn character_status(&self, channel: &ChannelId, name: &str) -> Vec<String> {
        match self.store.get(channel).await {
            Some(session) => session.lock().await.character_status(name),
            None => Vec::new(),
        }
    }

    /// Whether the channel has combat in progress
    pub async fn is_active(&self, channel: &ChannelId) -> bool {
        match self.store.get(channel).await {
            Some(session) => session.lock().await.is_active(),
            None => false,
        }
    }

    /// Debug snapshot of the channel's session
    pub async fn session_status(&self, channel: &ChannelId) -> Option<CombatStatus> {
        let session = self.store.get(channel).await?;
        let status = session.lock().await.status();
        Some(status)
    }

    /// Queue a display refresh from a session snapshot
    pub fn queue_display_update(&self, channel: &ChannelId, session: &CombatSession) -> bool {
        self.display.enqueue(channel.clone(), session.clone())
    }

    /// Session counts across channels
    pub async fn status(&self) -> TrackerStatus {
        TrackerStatus {
            sessions: self.store.len().await,
            active: self.store.active_count().await,
        }
    }

    fn after_change(&self, channel: &ChannelId, session: &mut CombatSession) -> TrackerUpdate {
        self.queue_display_update(channel, session);
        TrackerUpdate {
            applied: true,
            announcement: announce_turn(session),
        }
    }
}
