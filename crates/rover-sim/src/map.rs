//! Map asset store: resolves map names to image assets on disk.
//!
//! Maps are PNG files in a single configured directory. Lookups are
//! keyed by file name only; names carrying path separators or parent
//! components are rejected before touching the filesystem so a request
//! can never escape the maps directory.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::debug;

use crate::error::SimError;

/// Resolves map names to image bytes inside a configured directory.
#[derive(Debug, Clone)]
pub struct MapStore {
    root: PathBuf,
}

impl MapStore {
    /// Create a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this store resolves names against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reject names that could escape the maps directory.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidMapName`] for empty names or names
    /// containing `/`, `\`, or a `..` component.
    pub fn validate_name(name: &str) -> Result<(), SimError> {
        let escapes =
            name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..");
        if escapes {
            return Err(SimError::InvalidMapName {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    /// Load the raw bytes of a map asset.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidMapName`] for unsafe names,
    /// [`SimError::MapNotFound`] when no file exists under the name, and
    /// [`SimError::MapIo`] for other filesystem failures.
    pub async fn load_bytes(&self, name: &str) -> Result<Vec<u8>, SimError> {
        Self::validate_name(name)?;
        let path = self.root.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(map = name, bytes = bytes.len(), "map asset loaded");
                Ok(bytes)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(SimError::MapNotFound {
                name: name.to_owned(),
            }),
            Err(err) => Err(SimError::MapIo { source: err }),
        }
    }

    /// Load and decode a map asset into an RGBA image.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`load_bytes`](Self::load_bytes), plus
    /// [`SimError::MapDecode`] when the bytes are not a decodable image.
    pub async fn load_image(&self, name: &str) -> Result<RgbaImage, SimError> {
        let bytes = self.load_bytes(name).await?;
        let decoded = image::load_from_memory(&bytes).map_err(|err| SimError::MapDecode {
            message: err.to_string(),
        })?;
        Ok(decoded.to_rgba8())
    }
}
