//! Session lifecycle phase and the status projection served to clients.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::SessionId;

/// Lifecycle phase of a simulation session.
///
/// `Idle` is the initial phase; `Completed`, `Stopped`, and `Failed` are
/// terminal. Every transition between phases goes through the session
/// state machine -- no other code mutates the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No session work has begun.
    Idle,
    /// The step loop is advancing the simulation.
    Running,
    /// The step loop is suspended; the stream stays open.
    Paused,
    /// The simulation finished on its own (goals reached or step
    /// ceiling hit).
    Completed,
    /// An operator stop ended the session.
    Stopped,
    /// The engine or renderer failed mid-session.
    Failed,
}

impl SessionPhase {
    /// Whether this phase is terminal (no further transitions).
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Stopped | Self::Failed)
    }
}

/// JSON-serializable snapshot of the current session for status reporting.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionStatus {
    /// The session identifier.
    pub id: SessionId,
    /// Current lifecycle phase.
    pub phase: SessionPhase,
    /// Index of the last produced step, if any step has run.
    pub step: Option<u64>,
    /// ISO 8601 timestamp of when the session started.
    pub started_at: String,
}
