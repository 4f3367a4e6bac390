//! Stream events delivered to the browser over the live event stream.
//!
//! Each SSE `data:` payload is one JSON object in exactly one of three
//! shapes:
//!
//! - `{"step": 0, "frame": "<base64 PNG>"}` -- one rendered frame
//! - `{"status": "completed"}` / `{"status": "stopped"}` -- clean end
//! - `{"error": "<message>"}` -- the engine failed mid-session
//!
//! A terminal shape (`status` or `error`) is always the last event on a
//! stream; nothing follows it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// How a session ended cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum TerminalStatus {
    /// The simulation finished on its own.
    Completed,
    /// An operator stop ended the session.
    Stopped,
}

/// One event on the live stream.
///
/// Serialized untagged so the wire shapes above fall out directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(untagged)]
pub enum StreamEvent {
    /// One rendered frame: the step index and the PNG bytes as base64.
    Frame {
        /// Monotonic step index, starting at 0.
        step: u64,
        /// Base64-encoded PNG payload.
        frame: String,
    },
    /// The session ended cleanly.
    Status {
        /// Whether the session completed or was stopped.
        status: TerminalStatus,
    },
    /// The session ended because the engine failed.
    Error {
        /// Human-readable failure reason.
        error: String,
    },
}

impl StreamEvent {
    /// Whether this event is terminal (the last event on the stream).
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Error { .. })
    }
}
