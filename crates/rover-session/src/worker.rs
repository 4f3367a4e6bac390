//! The stream worker: drives the tick loop for one session.
//!
//! One Tokio task runs per session. Each iteration observes the state
//! machine, steps the frame producer while `Running`, and pushes the
//! outcome into a bounded channel consumed by the event stream:
//!
//! - **Pacing**: the worker sleeps the configured interval between
//!   frames. A slow consumer blocks the send instead -- pacing is
//!   sacrificed, ordering never is, and no frame is dropped.
//! - **Pause**: the worker parks on the machine's notification and
//!   holds the channel open; no frames are produced.
//! - **Stop**: observed before stepping and again after each push, so
//!   a stop takes effect within roughly one pacing interval.
//! - **Disconnect**: a closed channel means the consumer went away; the
//!   worker stops the session implicitly and exits without a terminal
//!   event, since there is no longer a reader.
//!
//! Terminal events are always the last event pushed; the registry slot
//! is released before the terminal event is sent so a new session can
//! start the moment the stream ends.

use std::sync::Arc;

use image::RgbaImage;
use tokio::sync::mpsc;
use tracing::{debug, info};

use rover_sim::{FrameRenderer, NavigationEngine};
use rover_types::{SessionId, SessionPhase};

use crate::config::SessionConfig;
use crate::error::LaunchError;
use crate::machine::SessionMachine;
use crate::producer::{Frame, FrameOutcome, FrameProducer};
use crate::registry::{SessionHandle, SessionRegistry};

/// Bound on frames buffered ahead of the consumer. Small on purpose:
/// the worker should pace the simulation, not race ahead of the stream.
const FRAME_CHANNEL_CAPACITY: usize = 8;

/// One event pushed from the worker to the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// One rendered frame.
    Frame(Frame),
    /// The session finished on its own. Terminal.
    Completed,
    /// An operator stop ended the session. Terminal.
    Stopped,
    /// The engine or renderer failed. Terminal.
    Failed(String),
}

/// A launched session: its id and the ordered event stream.
#[derive(Debug)]
pub struct SessionLaunch {
    /// The new session's identifier.
    pub id: SessionId,
    /// Ordered event stream ending in exactly one terminal event.
    pub events: mpsc::Receiver<SessionEvent>,
}

/// Assemble and launch a session: build the engine, renderer, and
/// producer from the config, claim the registry slot, and spawn the
/// worker task.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns [`LaunchError::Sim`] if the engine or renderer rejects the
/// configuration, and [`LaunchError::Control`] if a session is already
/// running.
pub fn launch(
    registry: &Arc<SessionRegistry>,
    config: &SessionConfig,
    background: RgbaImage,
) -> Result<SessionLaunch, LaunchError> {
    let engine = NavigationEngine::new(
        config.frame,
        config.spawn_robots(),
        config.goals.clone(),
        config.step_time,
    )?;
    let renderer = FrameRenderer::new(background, config.frame)?;
    let producer = FrameProducer::new(engine, renderer, config.step_ceiling);

    let machine = Arc::new(SessionMachine::new());
    machine.start()?;

    let handle = SessionHandle::new(machine);
    let id = handle.id;
    registry.register(handle.clone())?;

    let (tx, rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
    let worker_registry = Arc::clone(registry);
    let pacing = config.pacing;
    tokio::spawn(run_session(worker_registry, handle, producer, tx, pacing));

    info!(session = %id, "session launched");
    Ok(SessionLaunch { id, events: rx })
}

/// The tick loop for one session.
async fn run_session(
    registry: Arc<SessionRegistry>,
    handle: SessionHandle,
    mut producer: FrameProducer,
    tx: mpsc::Sender<SessionEvent>,
    pacing: std::time::Duration,
) {
    let machine = &handle.machine;
    debug!(session = %handle.id, "session worker started");

    loop {
        match machine.phase() {
            SessionPhase::Running => {}
            SessionPhase::Paused => {
                machine.wait_while_paused().await;
                continue;
            }
            SessionPhase::Stopped => {
                registry.unregister(handle.id);
                let _ = tx.send(SessionEvent::Stopped).await;
                break;
            }
            // Completed/Failed are set by this task right before it
            // exits, and Idle cannot recur after start. Nothing to do.
            _ => {
                registry.unregister(handle.id);
                break;
            }
        }

        match producer.step() {
            FrameOutcome::Frame(frame) => {
                let step = frame.step;
                if tx.send(SessionEvent::Frame(frame)).await.is_err() {
                    info!(
                        session = %handle.id,
                        step,
                        "consumer disconnected, stopping session"
                    );
                    let _ = machine.stop();
                    registry.unregister(handle.id);
                    break;
                }
                machine.record_step(step);
            }
            FrameOutcome::Completed => {
                let phase = machine.complete();
                registry.unregister(handle.id);
                let event = if matches!(phase, SessionPhase::Stopped) {
                    SessionEvent::Stopped
                } else {
                    SessionEvent::Completed
                };
                let _ = tx.send(event).await;
                break;
            }
            FrameOutcome::Failed(reason) => {
                let phase = machine.fail(&reason);
                registry.unregister(handle.id);
                let event = if matches!(phase, SessionPhase::Stopped) {
                    SessionEvent::Stopped
                } else {
                    SessionEvent::Failed(reason)
                };
                let _ = tx.send(event).await;
                break;
            }
        }

        // A stop that landed while the frame was in flight skips the
        // pacing sleep and is handled at the top of the loop.
        if matches!(machine.phase(), SessionPhase::Stopped) {
            continue;
        }
        tokio::time::sleep(pacing).await;
    }

    info!(
        session = %handle.id,
        phase = ?machine.phase(),
        "session worker exited"
    );
}
