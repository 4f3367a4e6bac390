//! Error types for the session control plane.

use rover_sim::SimError;

/// Precondition violations raised by the state machine and registry.
///
/// These are returned synchronously to the triggering control request
/// and never alter the session they were aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    /// A start request arrived while a session is already active.
    #[error("a simulation session is already running")]
    AlreadyRunning,

    /// A pause, resume, or stop request arrived with no active session.
    #[error("no active simulation session")]
    NoActiveSession,
}

/// Errors that can occur while assembling and launching a session.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The registry or machine rejected the launch.
    #[error(transparent)]
    Control(#[from] ControlError),

    /// Building the engine or renderer failed.
    #[error(transparent)]
    Sim(#[from] SimError),
}
