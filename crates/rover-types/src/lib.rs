//! Shared type definitions for the Rover navigation simulation.
//!
//! This crate is the single source of truth for types that cross crate
//! boundaries in the Rover workspace. Wire-facing types flow downstream
//! to `TypeScript` via `ts-rs` for the browser dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entity identifiers
//! - [`geometry`] -- Pixel/world coordinates and the canvas-to-world frame
//! - [`session`] -- Session lifecycle phase and status projection
//! - [`events`] -- Stream events delivered to the browser over SSE

pub mod events;
pub mod geometry;
pub mod ids;
pub mod session;

// Re-export all public types at crate root for convenience.
pub use events::{StreamEvent, TerminalStatus};
pub use geometry::{PixelPoint, WorldFrame, WorldPoint};
pub use ids::SessionId;
pub use session::{SessionPhase, SessionStatus};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. Importing them here triggers generation.
        // The actual files are written to the `bindings/` directory
        // relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::SessionId::export_all();
        let _ = crate::geometry::PixelPoint::export_all();
        let _ = crate::geometry::WorldPoint::export_all();
        let _ = crate::session::SessionPhase::export_all();
        let _ = crate::session::SessionStatus::export_all();
        let _ = crate::events::TerminalStatus::export_all();
        let _ = crate::events::StreamEvent::export_all();
    }
}
