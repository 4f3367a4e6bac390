//! The session registry: a single, explicitly synchronized session slot.
//!
//! At most one session is active process-wide. The registry owns that
//! invariant: `register` atomically checks-and-fills the slot, control
//! requests address "the current session" through it, and
//! `unregister` is idempotent and id-guarded so a stale worker exit can
//! never evict a newer session.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use rover_types::{SessionId, SessionStatus};

use crate::error::ControlError;
use crate::machine::SessionMachine;

/// Result of a pause request, distinguishing the two directions of the
/// `paused` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseOutcome {
    /// The session is now (or already was) paused.
    Paused,
    /// The session is now (or already was) running.
    Resumed,
}

/// An opaque reference to one session: its id, its state machine, and
/// when it started.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    /// The session identifier.
    pub id: SessionId,
    /// The session's state machine.
    pub machine: Arc<SessionMachine>,
    /// Wall-clock start time.
    pub started_at: DateTime<Utc>,
}

impl SessionHandle {
    /// Create a handle for a fresh session.
    pub fn new(machine: Arc<SessionMachine>) -> Self {
        Self {
            id: SessionId::new(),
            machine,
            started_at: Utc::now(),
        }
    }
}

/// Single-slot store for the current session handle.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    slot: Mutex<Option<SessionHandle>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Lock the slot, recovering from a poisoned mutex.
    fn lock(&self) -> std::sync::MutexGuard<'_, Option<SessionHandle>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically claim the slot for a new session.
    ///
    /// A slot holding a terminal session is cleared first -- reaching a
    /// terminal phase returns the machine to `Idle` from the registry's
    /// point of view on the next start.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::AlreadyRunning`] if a non-terminal
    /// session occupies the slot.
    pub fn register(&self, handle: SessionHandle) -> Result<(), ControlError> {
        let mut slot = self.lock();
        if let Some(current) = slot.as_ref()
            && !current.machine.phase().is_terminal()
        {
            return Err(ControlError::AlreadyRunning);
        }
        info!(session = %handle.id, "session registered");
        *slot = Some(handle);
        Ok(())
    }

    /// Release the slot if it still holds the given session.
    ///
    /// Idempotent and safe to race: every exit path of a worker may
    /// call it, and a stale call after a newer session registered is a
    /// no-op.
    pub fn unregister(&self, id: SessionId) {
        let mut slot = self.lock();
        if slot.as_ref().is_some_and(|current| current.id == id) {
            *slot = None;
            debug!(session = %id, "session unregistered");
        }
    }

    /// The current session handle, if one is registered.
    pub fn current(&self) -> Option<SessionHandle> {
        self.lock().clone()
    }

    /// The current non-terminal session, or `NoActiveSession`.
    fn active(&self) -> Result<SessionHandle, ControlError> {
        self.current()
            .filter(|handle| !handle.machine.phase().is_terminal())
            .ok_or(ControlError::NoActiveSession)
    }

    /// Pause or resume the current session.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::NoActiveSession`] if the slot is empty
    /// or terminal.
    pub fn pause(&self, paused: bool) -> Result<PauseOutcome, ControlError> {
        let handle = self.active()?;
        if paused {
            handle.machine.pause()?;
            Ok(PauseOutcome::Paused)
        } else {
            handle.machine.resume()?;
            Ok(PauseOutcome::Resumed)
        }
    }

    /// Stop the current session.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::NoActiveSession`] if the slot is empty
    /// or terminal.
    pub fn stop(&self) -> Result<(), ControlError> {
        let handle = self.active()?;
        handle.machine.stop()
    }

    /// Status projection of the current session, if any.
    pub fn status(&self) -> Option<SessionStatus> {
        self.current().map(|handle| SessionStatus {
            id: handle.id,
            phase: handle.machine.phase(),
            step: handle.machine.step(),
            started_at: handle.started_at.to_rfc3339(),
        })
    }
}
