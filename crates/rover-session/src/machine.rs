//! The session state machine: serialized lifecycle transitions.
//!
//! One [`SessionMachine`] exists per session. It owns the canonical
//! lifecycle phase plus the last produced step index and failure
//! message, all behind a single mutex so concurrent control requests
//! (pause/resume/stop from HTTP handlers) and the stream worker apply
//! their transitions atomically and in lock-arrival order. A request
//! that loses a race observes the post-transition phase, never a stale
//! one.
//!
//! Pause does not busy-poll: a paused worker parks on a
//! [`Notify`] and is woken by `resume` and `stop`.

use std::sync::{Mutex, PoisonError};

use tokio::sync::Notify;
use tracing::{debug, info};

use rover_types::SessionPhase;

use crate::error::ControlError;

/// Mutable session state guarded by the machine's mutex.
#[derive(Debug)]
struct MachineState {
    /// Current lifecycle phase.
    phase: SessionPhase,
    /// Index of the last delivered step, if any.
    step: Option<u64>,
    /// Failure message once the phase is `Failed`.
    last_error: Option<String>,
}

/// Serialization point for all lifecycle transitions of one session.
#[derive(Debug)]
pub struct SessionMachine {
    inner: Mutex<MachineState>,
    /// Wakes a paused worker on resume and on stop.
    wake: Notify,
}

impl SessionMachine {
    /// Create a machine in the `Idle` phase.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MachineState {
                phase: SessionPhase::Idle,
                step: None,
                last_error: None,
            }),
            wake: Notify::new(),
        }
    }

    /// Lock the state, recovering from a poisoned mutex.
    ///
    /// Panics cannot occur while the lock is held (all critical
    /// sections are straight-line), so poisoning is theoretical; the
    /// inner state is still consistent if it ever happens.
    fn lock(&self) -> std::sync::MutexGuard<'_, MachineState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// `Idle -> Running`.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::AlreadyRunning`] from any other phase.
    pub fn start(&self) -> Result<(), ControlError> {
        let mut state = self.lock();
        if !matches!(state.phase, SessionPhase::Idle) {
            return Err(ControlError::AlreadyRunning);
        }
        state.phase = SessionPhase::Running;
        info!("session started");
        Ok(())
    }

    /// `Running -> Paused`. Idempotent from `Paused`.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::NoActiveSession`] from `Idle` or a
    /// terminal phase.
    pub fn pause(&self) -> Result<(), ControlError> {
        let mut state = self.lock();
        match state.phase {
            SessionPhase::Running => {
                state.phase = SessionPhase::Paused;
                info!("session paused");
                Ok(())
            }
            SessionPhase::Paused => Ok(()),
            _ => Err(ControlError::NoActiveSession),
        }
    }

    /// `Paused -> Running`. Idempotent from `Running`. Wakes the worker.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::NoActiveSession`] from `Idle` or a
    /// terminal phase.
    pub fn resume(&self) -> Result<(), ControlError> {
        let mut state = self.lock();
        match state.phase {
            SessionPhase::Paused => {
                state.phase = SessionPhase::Running;
                drop(state);
                self.wake.notify_waiters();
                info!("session resumed");
                Ok(())
            }
            SessionPhase::Running => Ok(()),
            _ => Err(ControlError::NoActiveSession),
        }
    }

    /// `Running | Paused -> Stopped`. Wakes a paused worker so it can
    /// observe the stop promptly.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::NoActiveSession`] from `Idle` or a
    /// terminal phase.
    pub fn stop(&self) -> Result<(), ControlError> {
        let mut state = self.lock();
        match state.phase {
            SessionPhase::Running | SessionPhase::Paused => {
                state.phase = SessionPhase::Stopped;
                drop(state);
                self.wake.notify_waiters();
                info!("session stopped");
                Ok(())
            }
            _ => Err(ControlError::NoActiveSession),
        }
    }

    /// Producer reported `Completed`: `Running -> Completed`.
    ///
    /// If an operator stop was linearized first the phase stays
    /// `Stopped`. Returns the resulting phase so the worker emits the
    /// matching terminal event.
    pub fn complete(&self) -> SessionPhase {
        let mut state = self.lock();
        if matches!(state.phase, SessionPhase::Running) {
            state.phase = SessionPhase::Completed;
            info!("session completed");
        }
        state.phase
    }

    /// Producer reported `Failed`: `Running -> Failed` with the reason.
    ///
    /// If an operator stop was linearized first the phase stays
    /// `Stopped` and the reason is discarded. Returns the resulting
    /// phase so the worker emits the matching terminal event.
    pub fn fail(&self, reason: &str) -> SessionPhase {
        let mut state = self.lock();
        if matches!(state.phase, SessionPhase::Running) {
            state.phase = SessionPhase::Failed;
            state.last_error = Some(reason.to_owned());
            info!(reason, "session failed");
        }
        state.phase
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// The current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.lock().phase
    }

    /// Index of the last delivered step, if any.
    pub fn step(&self) -> Option<u64> {
        self.lock().step
    }

    /// The failure message, once the phase is `Failed`.
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Record a delivered step index (worker only).
    pub fn record_step(&self, step: u64) {
        self.lock().step = Some(step);
        debug!(step, "step recorded");
    }

    /// Park until the phase is no longer `Paused`.
    ///
    /// Returns immediately when not paused. The notified future is
    /// created before the phase check so a resume or stop racing this
    /// call cannot be missed.
    pub async fn wait_while_paused(&self) {
        loop {
            let notified = self.wake.notified();
            if !matches!(self.phase(), SessionPhase::Paused) {
                return;
            }
            notified.await;
        }
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}
