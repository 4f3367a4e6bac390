//! HTTP control surface for the Rover simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Session control endpoints** for starting (with a live
//!   Server-Sent Events frame stream), pausing/resuming, and stopping
//!   the single active session
//! - **Map asset endpoint** serving map images to the dashboard canvas
//! - **Health probe and minimal HTML status page**
//!
//! # Architecture
//!
//! Handlers route every session mutation through the
//! [`SessionRegistry`](rover_session::SessionRegistry) held in
//! [`AppState`], so the HTTP layer carries no session state of its own.
//! The start handler adapts the session worker's bounded event channel
//! directly into the SSE response body: backpressure from a slow
//! client propagates to the worker, and a dropped body stops the
//! session implicitly.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
