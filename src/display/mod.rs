//! Combat display
//!
//! Mirrors each channel's session into a single, continuously edited message:
//! - Rendering a session into a view model
//! - The publisher capability (create / edit)
//! - A bounded, single-consumer update queue

mod publish;
mod queue;
mod render;

pub use publish::{ConsolePublisher, DisplayHandle, PublishError, Publisher};
pub use queue::{DisplayUpdateQueue, DEFAULT_QUEUE_CAPACITY};
pub use render::{
    render, render_conclusion, RenderedView, ViewField, ACTIVE_COLOR, ENDED_COLOR,
    MAX_POSITIONS_SHOWN,
};
