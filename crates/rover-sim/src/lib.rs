//! Navigation engine, map assets, and frame rendering for the Rover
//! simulation.
//!
//! This crate models the physical side of a session: robots chasing an
//! ordered list of goal points across a map, and the rendering of each
//! discrete step into a PNG frame for the browser.
//!
//! # Modules
//!
//! - [`engine`] -- [`NavigationEngine`]: advances every robot by one
//!   discrete step and reports when all goals are reached.
//! - [`error`] -- Error types for map, engine, and render operations.
//! - [`map`] -- [`MapStore`]: resolves map names to image assets inside
//!   a configured directory, with traversal-safe lookups.
//! - [`render`] -- [`FrameRenderer`]: composites robots and goal markers
//!   onto the decoded map background and encodes PNG bytes.
//! - [`robot`] -- Robot kinematic parameters and per-step pose updates.

pub mod engine;
pub mod error;
pub mod map;
pub mod render;
pub mod robot;

// Re-export primary types at crate root.
pub use engine::NavigationEngine;
pub use error::SimError;
pub use map::MapStore;
pub use render::{FrameRenderer, ROBOT_PALETTE};
pub use robot::{Robot, RobotParams};
