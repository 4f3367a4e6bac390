//! Pixel/world coordinates and the canvas-to-world mapping.
//!
//! The operator clicks on a map canvas in pixel space (origin top-left,
//! Y growing downward). The navigation engine works in metres (origin
//! bottom-left, Y growing upward). A [`WorldFrame`] captures the map
//! dimensions and scale and converts between the two, inverting the Y
//! axis in both directions.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A point on the map canvas, in pixels. Origin is the top-left corner
/// and Y grows downward, matching the browser canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PixelPoint {
    /// Horizontal pixel coordinate.
    pub x: f64,
    /// Vertical pixel coordinate (downward).
    pub y: f64,
}

/// A point in the simulation world, in metres. Origin is the bottom-left
/// corner and Y grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldPoint {
    /// Horizontal world coordinate in metres.
    pub x: f64,
    /// Vertical world coordinate in metres (upward).
    pub y: f64,
}

impl WorldPoint {
    /// Euclidean distance to another world point, in metres.
    pub fn distance_to(&self, other: Self) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx.hypot(dy)
    }
}

/// Map dimensions and scale tying pixel space to world space.
///
/// `px_per_metre` must be positive; configuration validation enforces
/// this before a frame is ever constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldFrame {
    /// Map width in pixels.
    pub width_px: u32,
    /// Map height in pixels.
    pub height_px: u32,
    /// Pixels per metre (e.g. 100 px = 1 m).
    pub px_per_metre: f64,
}

impl WorldFrame {
    /// World width in metres.
    pub fn width_metres(&self) -> f64 {
        f64::from(self.width_px) / self.px_per_metre
    }

    /// World height in metres.
    pub fn height_metres(&self) -> f64 {
        f64::from(self.height_px) / self.px_per_metre
    }

    /// Convert a canvas pixel point to world metres, inverting the Y axis.
    pub fn to_world(&self, point: PixelPoint) -> WorldPoint {
        WorldPoint {
            x: point.x / self.px_per_metre,
            y: (f64::from(self.height_px) - point.y) / self.px_per_metre,
        }
    }

    /// Convert a world point back to canvas pixels, inverting the Y axis.
    pub fn to_pixel(&self, point: WorldPoint) -> PixelPoint {
        PixelPoint {
            x: point.x * self.px_per_metre,
            y: f64::from(self.height_px) - point.y * self.px_per_metre,
        }
    }

    /// Clamp a world point into the frame's world rectangle.
    pub fn clamp(&self, point: WorldPoint) -> WorldPoint {
        WorldPoint {
            x: point.x.clamp(0.0, self.width_metres()),
            y: point.y.clamp(0.0, self.height_metres()),
        }
    }
}
