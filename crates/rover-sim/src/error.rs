//! Error types for the `rover-sim` crate.
//!
//! All fallible operations in this crate return [`SimError`] through the
//! standard [`Result`] type alias.

/// Errors that can occur while loading maps, stepping the engine, or
/// rendering frames.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The map name contains path separators or parent components.
    #[error("invalid map name: {name}")]
    InvalidMapName {
        /// The rejected name.
        name: String,
    },

    /// No map asset exists under the given name.
    #[error("map not found: {name}")]
    MapNotFound {
        /// The requested name.
        name: String,
    },

    /// Reading a map asset from disk failed.
    #[error("failed to read map asset: {source}")]
    MapIo {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The map asset could not be decoded as an image.
    #[error("failed to decode map image: {message}")]
    MapDecode {
        /// Decoder error description.
        message: String,
    },

    /// The map image dimensions do not match the configured world frame.
    #[error("map is {actual_width}x{actual_height} px but the world frame expects {expected_width}x{expected_height} px")]
    MapDimensionMismatch {
        /// Configured frame width in pixels.
        expected_width: u32,
        /// Configured frame height in pixels.
        expected_height: u32,
        /// Decoded image width in pixels.
        actual_width: u32,
        /// Decoded image height in pixels.
        actual_height: u32,
    },

    /// The engine was constructed with a non-positive step time.
    #[error("step time must be positive, got {value}")]
    InvalidStepTime {
        /// The rejected step time in seconds.
        value: f64,
    },

    /// A robot pose became non-finite (NaN or infinite) during stepping.
    #[error("robot pose diverged to a non-finite value at step {step}")]
    NumericDivergence {
        /// The step at which the divergence was detected.
        step: u64,
    },

    /// Encoding a rendered frame to PNG failed.
    #[error("failed to encode frame: {message}")]
    FrameEncode {
        /// Encoder error description.
        message: String,
    },
}
