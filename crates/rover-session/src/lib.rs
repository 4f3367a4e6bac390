//! Session controller for the Rover simulation.
//!
//! This crate owns everything between an operator's start request and
//! the ordered event stream the browser consumes:
//!
//! - [`config`] -- Runtime configuration (`rover-config.yaml`), start
//!   request validation, and the generated scenario file.
//! - [`machine`] -- The session state machine: serialized lifecycle
//!   transitions (`Idle -> Running -> Paused/Completed/Stopped/Failed`)
//!   with explicit precondition errors.
//! - [`producer`] -- The frame producer: one engine step rendered into
//!   one outcome, with a hard step ceiling.
//! - [`registry`] -- The single-slot session registry guaranteeing at
//!   most one active session process-wide.
//! - [`worker`] -- The per-session tick loop: pacing, pause parking,
//!   prompt stop, backpressure, and disconnect handling.
//! - [`error`] -- Control-plane error types.

pub mod config;
pub mod error;
pub mod machine;
pub mod producer;
pub mod registry;
pub mod worker;

// Re-export primary types at crate root.
pub use config::{ConfigError, RoverConfig, ScenarioFile, SessionConfig, SessionRequest};
pub use error::{ControlError, LaunchError};
pub use machine::SessionMachine;
pub use producer::{Frame, FrameOutcome, FrameProducer};
pub use registry::{PauseOutcome, SessionHandle, SessionRegistry};
pub use worker::{SessionEvent, SessionLaunch, launch};
