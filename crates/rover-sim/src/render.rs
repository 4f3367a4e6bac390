//! Frame rendering: composites robots and goal markers onto the map.
//!
//! The renderer decodes the map image once per session into an RGBA
//! background. Every frame clones the background, draws each goal as a
//! ring with a center dot and each robot as a filled disc with a heading
//! tick, then encodes the canvas as PNG bytes for the event stream.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use rover_types::{PixelPoint, WorldFrame};

use crate::engine::NavigationEngine;
use crate::error::SimError;

/// Display colors assigned to robots by spawn index, cycling when there
/// are more robots than palette entries.
pub const ROBOT_PALETTE: [[u8; 3]; 10] = [
    [0x00, 0xd9, 0xff], // cyan
    [0x00, 0xff, 0x88], // green
    [0xff, 0x6b, 0x00], // orange
    [0xff, 0x00, 0xff], // magenta
    [0xff, 0xff, 0x00], // yellow
    [0x00, 0xff, 0xff], // cyan
    [0xff, 0x00, 0x88], // pink
    [0x88, 0xff, 0x00], // lime
    [0x00, 0x88, 0xff], // blue
    [0xff, 0x88, 0x00], // orange
];

/// Goal marker color (RGB).
const GOAL_COLOR: [u8; 3] = [0xdc, 0x26, 0x26];

/// Goal ring radius in pixels.
const GOAL_RING_PX: f64 = 10.0;

/// Goal center dot radius in pixels.
const GOAL_DOT_PX: f64 = 3.0;

/// Renders simulation state onto a fixed map background.
#[derive(Debug)]
pub struct FrameRenderer {
    background: RgbaImage,
    frame: WorldFrame,
}

impl FrameRenderer {
    /// Create a renderer over a decoded map background.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MapDimensionMismatch`] if the image does not
    /// match the world frame's pixel dimensions.
    pub fn new(background: RgbaImage, frame: WorldFrame) -> Result<Self, SimError> {
        if background.width() != frame.width_px || background.height() != frame.height_px {
            return Err(SimError::MapDimensionMismatch {
                expected_width: frame.width_px,
                expected_height: frame.height_px,
                actual_width: background.width(),
                actual_height: background.height(),
            });
        }
        Ok(Self { background, frame })
    }

    /// Render the engine's current state to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::FrameEncode`] if PNG encoding fails.
    pub fn render(&self, engine: &NavigationEngine) -> Result<Vec<u8>, SimError> {
        let mut canvas = self.background.clone();

        for goal in engine.goals() {
            let center = self.frame.to_pixel(*goal);
            draw_ring(&mut canvas, center, GOAL_RING_PX, GOAL_COLOR);
            draw_disc(&mut canvas, center, GOAL_DOT_PX, GOAL_COLOR);
        }

        for robot in engine.robots() {
            let center = self.frame.to_pixel(robot.position);
            let radius_px = robot.params.radius * self.frame.px_per_metre;
            draw_disc(&mut canvas, center, radius_px, robot.color);
            draw_heading_tick(&mut canvas, center, radius_px, robot.heading);
        }

        encode_png(&canvas)
    }
}

/// Encode an RGBA canvas as PNG bytes.
fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, SimError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|err| SimError::FrameEncode {
            message: err.to_string(),
        })?;
    Ok(bytes)
}

/// Truncate a finite pixel coordinate for addressing.
#[allow(clippy::cast_possible_truncation)]
fn to_px(value: f64) -> i64 {
    value as i64
}

/// Set a pixel if it lies inside the canvas.
fn put_pixel_checked(canvas: &mut RgbaImage, x: i64, y: i64, color: [u8; 3]) {
    let (Ok(px), Ok(py)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    if let Some(pixel) = canvas.get_pixel_mut_checked(px, py) {
        *pixel = Rgba([color[0], color[1], color[2], 0xff]);
    }
}

/// Draw a filled disc centered at `center` with the given pixel radius.
fn draw_disc(canvas: &mut RgbaImage, center: PixelPoint, radius: f64, color: [u8; 3]) {
    let r2 = radius * radius;
    let min_x = to_px((center.x - radius).floor());
    let max_x = to_px((center.x + radius).ceil());
    let min_y = to_px((center.y - radius).floor());
    let max_y = to_px((center.y + radius).ceil());
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = f64_from_i64(x) - center.x;
            let dy = f64_from_i64(y) - center.y;
            if dx.mul_add(dx, dy * dy) <= r2 {
                put_pixel_checked(canvas, x, y, color);
            }
        }
    }
}

/// Draw a one-pixel-thick ring centered at `center`.
fn draw_ring(canvas: &mut RgbaImage, center: PixelPoint, radius: f64, color: [u8; 3]) {
    let inner = (radius - 1.0).max(0.0);
    let inner2 = inner * inner;
    let outer2 = radius * radius;
    let min_x = to_px((center.x - radius).floor());
    let max_x = to_px((center.x + radius).ceil());
    let min_y = to_px((center.y - radius).floor());
    let max_y = to_px((center.y + radius).ceil());
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = f64_from_i64(x) - center.x;
            let dy = f64_from_i64(y) - center.y;
            let d2 = dx.mul_add(dx, dy * dy);
            if d2 <= outer2 && d2 >= inner2 {
                put_pixel_checked(canvas, x, y, color);
            }
        }
    }
}

/// Draw a short line from the disc edge outward along the heading so
/// the robot's orientation is visible. Canvas Y grows downward, so the
/// world heading's Y component is negated.
fn draw_heading_tick(canvas: &mut RgbaImage, center: PixelPoint, radius: f64, heading: f64) {
    let steps = to_px(radius.ceil()).max(1);
    let (dir_x, dir_y) = (heading.cos(), -heading.sin());
    let mut offset = 0_i64;
    while offset <= steps {
        let t = radius + f64_from_i64(offset);
        let x = to_px(dir_x.mul_add(t, center.x).round());
        let y = to_px(dir_y.mul_add(t, center.y).round());
        put_pixel_checked(canvas, x, y, [0xff, 0xff, 0xff]);
        offset = offset.saturating_add(1);
    }
}

/// Lossless-enough i64 -> f64 for pixel coordinates (always far below
/// 2^53 here).
#[allow(clippy::cast_precision_loss)]
fn f64_from_i64(value: i64) -> f64 {
    value as f64
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::robot::{Robot, RobotParams};
    use rover_types::WorldPoint;

    fn frame() -> WorldFrame {
        WorldFrame {
            width_px: 80,
            height_px: 60,
            px_per_metre: 10.0,
        }
    }

    fn blank_background() -> RgbaImage {
        RgbaImage::from_pixel(80, 60, Rgba([0x10, 0x10, 0x10, 0xff]))
    }

    fn engine_with_robot() -> NavigationEngine {
        let robot = Robot::new(
            WorldPoint { x: 4.0, y: 3.0 },
            0.0,
            RobotParams::default(),
            ROBOT_PALETTE[0],
        );
        NavigationEngine::new(
            frame(),
            vec![robot],
            vec![WorldPoint { x: 7.0, y: 5.0 }],
            0.1,
        )
        .unwrap()
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let wrong = RgbaImage::new(10, 10);
        let err = FrameRenderer::new(wrong, frame()).err().unwrap();
        assert!(matches!(err, SimError::MapDimensionMismatch { .. }));
    }

    #[test]
    fn rendered_frame_is_png() {
        let renderer = FrameRenderer::new(blank_background(), frame()).unwrap();
        let bytes = renderer.render(&engine_with_robot()).unwrap();
        // PNG magic number.
        assert_eq!(bytes.get(..8), Some(&[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a][..]));
    }

    #[test]
    fn rendered_frame_decodes_to_frame_dimensions() {
        let renderer = FrameRenderer::new(blank_background(), frame()).unwrap();
        let bytes = renderer.render(&engine_with_robot()).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 80);
        assert_eq!(decoded.height(), 60);
    }

    #[test]
    fn robot_pixels_are_painted() {
        let renderer = FrameRenderer::new(blank_background(), frame()).unwrap();
        let bytes = renderer.render(&engine_with_robot()).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        // Robot at world (4, 3) projects to pixel (40, 30) on an
        // Y-inverted 80x60 canvas.
        let pixel = decoded.get_pixel_checked(40, 30).copied().unwrap();
        assert_eq!(pixel.0.get(..3), Some(&ROBOT_PALETTE[0][..]));
    }

    #[test]
    fn goal_marker_is_painted() {
        let renderer = FrameRenderer::new(blank_background(), frame()).unwrap();
        let bytes = renderer.render(&engine_with_robot()).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        // Goal at world (7, 5) projects to pixel (70, 10); the center
        // dot paints it in the goal color.
        let pixel = decoded.get_pixel_checked(70, 10).copied().unwrap();
        assert_eq!(pixel.0.get(..3), Some(&GOAL_COLOR[..]));
    }
}
