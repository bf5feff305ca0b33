//! Notification adapters.
//!
//! - `messages` - Notice, session and schedule text
//! - `TracingNotifier` / `TracingSessionRenderer` - Log-backed delivery
//! - `RecordingNotifier` / `RecordingRenderer` - Capture for tests

pub mod messages;
mod recording;
mod tracing_notifier;

pub use recording::{RecordingNotifier, RecordingRenderer};
pub use tracing_notifier::{TracingNotifier, TracingSessionRenderer};
