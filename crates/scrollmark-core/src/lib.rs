//! Position tracking and progress synchronization for a scrolling panel
//! reader.
//!
//! A [`session::ReaderSession`] is opened per content view. It restores the
//! saved position against a layout that is still settling, maps every scroll
//! onto a logical [`position::Position`], and hands debounced progress
//! records to a [`transport::ProgressTransport`].

pub mod config;
pub mod gesture;
pub mod layout;
pub mod position;
pub mod resume;
pub mod runtime;
pub mod session;
pub mod sync;
pub mod timer;
pub mod transport;

#[cfg(test)]
mod testing;

pub use config::{BodyEncoding, EngineConfig, PositionMode};
pub use layout::{LayoutIndex, LayoutSurface, Panel, Viewport};
pub use position::{Position, PositionTracker};
pub use runtime::{ReaderRuntime, ViewportControl};
pub use session::{Effect, ReaderEvent, ReaderSession};
pub use sync::{ProgressRecord, ProgressSync};
pub use transport::{HttpTransport, LogTransport, ProgressTransport};
