//! Display update queue
//!
//! Every render-and-publish goes through one bounded queue drained by a single
//! background task, so a channel's message is never edited by two updates at
//! once and publishing never blocks the code that changed the state. When the
//! queue is full the update is dropped: the display is a best-effort mirror of
//! the session, not its record.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::publish::{DisplayHandle, PublishError, Publisher};
use super::render::{render, render_conclusion, RenderedView};
use crate::combat::{CombatSession, CombatSummary};
use crate::ChannelId;

/// Default queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Work item for the display task
#[derive(Debug)]
enum DisplayUpdate {
    /// Re-render the channel's live view from a snapshot
    Refresh {
        channel: ChannelId,
        snapshot: Box<CombatSession>,
    },
    /// Show the final view and release the channel's message
    Conclude {
        channel: ChannelId,
        summary: CombatSummary,
    },
}

impl DisplayUpdate {
    fn channel(&self) -> &ChannelId {
        match self {
            DisplayUpdate::Refresh { channel, .. } => channel,
            DisplayUpdate::Conclude { channel, .. } => channel,
        }
    }
}

/// Sending side of the display pipeline
#[derive(Debug, Clone)]
pub struct DisplayUpdateQueue {
    tx: mpsc::Sender<DisplayUpdate>,
}

impl DisplayUpdateQueue {
    /// Start the display task. It runs until every queue handle is dropped,
    /// draining whatever is still queued.
    pub fn spawn(publisher: Arc<dyn Publisher>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = DisplayWorker {
            publisher,
            rx,
            handles: HashMap::new(),
        };
        let task = tokio::spawn(worker.run());
        (Self { tx }, task)
    }

    /// Queue a refresh of the channel's view. Returns false if it was dropped.
    pub fn enqueue(&self, channel: ChannelId, snapshot: CombatSession) -> bool {
        self.push(DisplayUpdate::Refresh {
            channel,
            snapshot: Box::new(snapshot),
        })
    }

    /// Queue the end-of-combat view. Returns false if it was dropped.
    pub fn conclude(&self, channel: ChannelId, summary: CombatSummary) -> bool {
        self.push(DisplayUpdate::Conclude { channel, summary })
    }

    fn push(&self, update: DisplayUpdate) -> bool {
        match self.tx.try_send(update) {
            Ok(()) => true,
            Err(TrySendError::Full(update)) => {
                warn!(channel = %update.channel(), "Display queue full, dropping update");
                false
            }
            Err(TrySendError::Closed(update)) => {
                warn!(channel = %update.channel(), "Display task stopped, dropping update");
                false
            }
        }
    }
}

/// The single consumer: owns each channel's display handle
struct DisplayWorker {
    publisher: Arc<dyn Publisher>,
    rx: mpsc::Receiver<DisplayUpdate>,
    handles: HashMap<ChannelId, DisplayHandle>,
}

impl DisplayWorker {
    async fn run(mut self) {
        info!("Display updater started");
        while let Some(update) = self.rx.recv().await {
            self.process(update).await;
        }
        info!("Display updater stopped");
    }

    async fn process(&mut self, update: DisplayUpdate) {
        match update {
            DisplayUpdate::Refresh { channel, snapshot } => {
                let view = render(&snapshot);
                self.publish(&channel, &view).await;
            }
            DisplayUpdate::Conclude { channel, summary } => {
                let Some(handle) = self.handles.remove(&channel) else {
                    debug!(%channel, "No display to conclude");
                    return;
                };
                let view = render_conclusion(&summary);
                match self.publisher.edit(&handle, &view).await {
                    Ok(()) => debug!(%channel, "Display concluded"),
                    Err(PublishError::NotFound) => debug!(%channel, "Display already gone"),
                    Err(e) => warn!(%channel, error = %e, "Failed to conclude display"),
                }
            }
        }
    }

    async fn publish(&mut self, channel: &ChannelId, view: &RenderedView) {
        let Some(handle) = self.handles.get(channel).cloned() else {
            self.create(channel, view).await;
            return;
        };

        match self.publisher.edit(&handle, view).await {
            Ok(()) => debug!(%channel, %handle, "Display updated"),
            Err(PublishError::NotFound) => {
                info!(%channel, %handle, "Display message gone, posting a replacement");
                self.handles.remove(channel);
                self.create(channel, view).await;
            }
            Err(e) => warn!(%channel, error = %e, "Failed to update display"),
        }
    }

    async fn create(&mut self, channel: &ChannelId, view: &RenderedView) {
        match self.publisher.create(channel, view).await {
            Ok(handle) => {
                debug!(%channel, %handle, "Display created");
                self.handles.insert(channel.clone(), handle);
            }
            Err(e) => warn!(%channel, error = %e, "Failed to create display"),
        }
    }
}
