use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors: the map could not be loaded at all.
#[derive(Debug, Error)]
pub enum MapError {
    /// File I/O error
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File that failed to read
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
    /// JSON parse error
    #[error("JSON parse error in {path}: {source}")]
    Json {
        /// Document that failed to parse
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },
    /// Structurally invalid map (missing or zero dimensions, ...)
    #[error("invalid map: {0}")]
    InvalidMap(String),
    /// Unsupported file format (non-JSON)
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Recoverable problems found while loading. The offending item was skipped
/// or degraded and loading carried on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadWarning {
    /// A layer entry could not be decoded
    #[error("skipped malformed layer #{index}: {reason}")]
    MalformedLayer {
        /// Position in its parent layer list
        index: usize,
        /// Decode error
        reason: String,
    },
    /// A tile layer's data length does not match width * height
    #[error("skipped layer '{layer}': data length {len} does not match {width}x{height}")]
    LayerSizeMismatch {
        /// Layer name
        layer: String,
        /// Actual data length
        len: usize,
        /// Declared width
        width: usize,
        /// Declared height
        height: usize,
    },
    /// An object entry could not be decoded
    #[error("skipped malformed object #{index} in layer '{layer}': {reason}")]
    MalformedObject {
        /// Layer name
        layer: String,
        /// Position in the layer's object list
        index: usize,
        /// Decode error
        reason: String,
    },
    /// A tileset entry could not be decoded
    #[error("skipped malformed tileset #{index}: {reason}")]
    MalformedTileset {
        /// Position in the tileset list
        index: usize,
        /// Decode error
        reason: String,
    },
    /// A tileset image was absent or unreadable; the tileset is a placeholder
    #[error("tileset '{tileset}' has no usable image: {reason}")]
    TilesetImage {
        /// Tileset name (or firstgid when unnamed)
        tileset: String,
        /// Why the image is unusable
        reason: String,
    },
    /// Extrusion failed; the tileset keeps its unmodified image
    #[error("atlas extrusion failed for tileset '{tileset}': {reason}")]
    AtlasFallback {
        /// Tileset name
        tileset: String,
        /// Builder error
        reason: String,
    },
    /// Declared columns/tile count disagree with the image; clamped to what fits
    #[error("tileset '{tileset}' declares {declared} {what}, image holds {fits}")]
    TilesetGeometry {
        /// Tileset name
        tileset: String,
        /// `"columns"` or `"tiles"`
        what: &'static str,
        /// Authored value
        declared: u32,
        /// Value used instead
        fits: u32,
    },
    /// A polygon with fewer than three vertices
    #[error("discarded polygon object {object_id} in layer '{layer}': {points} vertices")]
    DegeneratePolygon {
        /// Layer name
        layer: String,
        /// Object id
        object_id: u32,
        /// Vertex count
        points: usize,
    },
    /// A non-walkable object whose shape cannot block movement
    #[error("ignored non-walkable object {object_id} in layer '{layer}': unsupported shape")]
    UnsupportedCollisionShape {
        /// Layer name
        layer: String,
        /// Object id
        object_id: u32,
    },
    /// A color string that is not `#RRGGBB` / `#AARRGGBB`
    #[error("invalid color '{value}' on object {object_id}, using default")]
    InvalidColor {
        /// Object id
        object_id: u32,
        /// Raw string
        value: String,
    },
    /// A custom property of a type this loader does not model
    #[error("skipped property '{name}' of unsupported type '{kind}'")]
    UnsupportedPropertyType {
        /// Property name
        name: String,
        /// Declared type
        kind: String,
    },
    /// The spawn override sidecar exists but could not be used
    #[error("ignored spawn override file {path}: {reason}")]
    SpawnOverrides {
        /// Sidecar path
        path: PathBuf,
        /// Why it was ignored
        reason: String,
    },
}

/// Collects [`LoadWarning`]s during a load, logging each one as it arrives.
#[derive(Debug, Default)]
pub struct LoadReport {
    warnings: Vec<LoadWarning>,
}

impl LoadReport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn warn(&mut self, warning: LoadWarning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    pub(crate) fn into_warnings(self) -> Vec<LoadWarning> {
        self.warnings
    }

    /// Warnings collected so far
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }
}
