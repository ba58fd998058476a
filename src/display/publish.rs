//! Publishing rendered views
//!
//! A publisher is the capability to post a view to a channel and to edit a
//! previously posted one. The chat platform behind it is outside this crate.

use std::collections::HashSet;
use std::io::Write;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

use super::render::RenderedView;
use crate::ChannelId;

/// Opaque reference to a posted view
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayHandle(pub String);

impl std::fmt::Display for DisplayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors reported by a publisher
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PublishError {
    /// The posted view no longer exists (deleted by someone)
    #[error("display target not found")]
    NotFound,

    #[error("publish failed: {0}")]
    Failed(String),
}

/// Posts and edits rendered views
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Post a new view to a channel
    async fn create(
        &self,
        channel: &ChannelId,
        view: &RenderedView,
    ) -> Result<DisplayHandle, PublishError>;

    /// Replace the content of a posted view
    async fn edit(&self, handle: &DisplayHandle, view: &RenderedView) -> Result<(), PublishError>;
}

/// Publisher that writes views to stdout
#[derive(Debug, Default)]
pub struct ConsolePublisher {
    handles: Mutex<HashSet<DisplayHandle>>,
}

impl ConsolePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    fn print(&self, header: &str, view: &RenderedView) -> Result<(), PublishError> {
        let mut stdout = std::io::stdout().lock();
        write!(stdout, "{}\n{}", header, view.to_text())
            .and_then(|_| stdout.flush())
            .map_err(|e| PublishError::Failed(e.to_string()))
    }
}

#[async_trait]
impl Publisher for ConsolePublisher {
    async fn create(
        &self,
        channel: &ChannelId,
        view: &RenderedView,
    ) -> Result<DisplayHandle, PublishError> {
        let handle = DisplayHandle(uuid::Uuid::new_v4().to_string());
        self.print(&format!("#{} new display {}", channel, handle), view)?;
        self.handles.lock().insert(handle.clone());
        Ok(handle)
    }

    async fn edit(&self, handle: &DisplayHandle, view: &RenderedView) -> Result<(), PublishError> {
        if !self.handles.lock().contains(handle) {
            return Err(PublishError::NotFound);
        }
        self.print(&format!("display {} updated", handle), view)
    }
}
