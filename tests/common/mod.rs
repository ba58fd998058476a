//! Common test utilities - a recording publisher and tracker setup

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use skirmish::display::{DisplayHandle, DisplayUpdateQueue, PublishError, Publisher, RenderedView};
use skirmish::store::SessionStore;
use skirmish::{ChannelId, CombatTracker};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// One publisher call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Published {
    Create {
        channel: ChannelId,
        handle: DisplayHandle,
        view: RenderedView,
    },
    Edit {
        handle: DisplayHandle,
        view: RenderedView,
    },
}

impl Published {
    pub fn view(&self) -> &RenderedView {
        match self {
            Published::Create { view, .. } => view,
            Published::Edit { view, .. } => view,
        }
    }

    pub fn handle(&self) -> &DisplayHandle {
        match self {
            Published::Create { handle, .. } => handle,
            Published::Edit { handle, .. } => handle,
        }
    }
}

/// Publisher that records every call.
///
/// Handles can be deleted to simulate a removed message, and the publisher
/// can be gated so that every call waits for a permit.
#[derive(Default)]
pub struct RecordingPublisher {
    calls: Mutex<Vec<Published>>,
    deleted: Mutex<HashSet<DisplayHandle>>,
    next_id: Mutex<u64>,
    gate: Option<Arc<Semaphore>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher whose calls block until `gate` hands out a permit
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Published> {
        self.calls.lock().clone()
    }

    /// Make later edits of this handle report NotFound
    pub fn delete(&self, handle: &DisplayHandle) {
        self.deleted.lock().insert(handle.clone());
    }

    async fn wait_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn create(
        &self,
        channel: &ChannelId,
        view: &RenderedView,
    ) -> Result<DisplayHandle, PublishError> {
        self.wait_gate().await;
        let handle = {
            let mut next_id = self.next_id.lock();
            *next_id += 1;
            DisplayHandle(format!("msg-{}", next_id))
        };
        self.calls.lock().push(Published::Create {
            channel: channel.clone(),
            handle: handle.clone(),
            view: view.clone(),
        });
        Ok(handle)
    }

    async fn edit(&self, handle: &DisplayHandle, view: &RenderedView) -> Result<(), PublishError> {
        self.wait_gate().await;
        if self.deleted.lock().contains(handle) {
            return Err(PublishError::NotFound);
        }
        self.calls.lock().push(Published::Edit {
            handle: handle.clone(),
            view: view.clone(),
        });
        Ok(())
    }
}

/// A tracker wired to a recording publisher
pub struct TestTracker {
    pub tracker: CombatTracker,
    pub publisher: Arc<RecordingPublisher>,
    task: JoinHandle<()>,
}

impl TestTracker {
    pub fn start() -> Self {
        Self::with_publisher(Arc::new(RecordingPublisher::new()), 64)
    }

    pub fn with_publisher(publisher: Arc<RecordingPublisher>, capacity: usize) -> Self {
        let (display, task) = DisplayUpdateQueue::spawn(publisher.clone(), capacity);
        Self {
            tracker: CombatTracker::new(SessionStore::shared(), display),
            publisher,
            task,
        }
    }

    /// Close the queue, wait for the display task to drain it and return
    /// everything that was published
    pub async fn finish(self) -> Vec<Published> {
        let TestTracker {
            tracker,
            publisher,
            task,
        } = self;
        drop(tracker);
        task.await.unwrap();
        publisher.calls()
    }
}
