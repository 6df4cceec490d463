use std::collections::HashMap;
use std::path::Path;

use macroquad::prelude::*;
use serde::Deserialize;

use crate::error::{LoadReport, LoadWarning};

/// One entry of the sidecar file.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SpawnOverride {
    /// Tile coordinates; the spawn lands on the tile's center.
    Tile {
        /// Tile column
        x: i32,
        /// Tile row
        y: i32,
    },
    /// Pixel coordinates, used as-is.
    Pixel {
        /// World x
        x: f32,
        /// World y
        y: f32,
    },
}

impl SpawnOverride {
    /// Spawn position in world pixels.
    pub fn to_pixels(self, tile_size: Vec2) -> Vec2 {
        match self {
            Self::Tile { x, y } => vec2((x as f32 + 0.5) * tile_size.x, (y as f32 + 0.5) * tile_size.y),
            Self::Pixel { x, y } => vec2(x, y),
        }
    }
}

/// Spawn overrides keyed by map path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SpawnOverrides(HashMap<String, SpawnOverride>);

impl SpawnOverrides {
    /// Read the sidecar. A missing file is silently empty; an unreadable or
    /// malformed one is reported and ignored.
    pub fn load(path: &Path, report: &mut LoadReport) -> Self {
        if !path.exists() {
            return Self::default();
        }
        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|txt| serde_json::from_str(&txt).map_err(|e| e.to_string()));
        match parsed {
            Ok(overrides) => overrides,
            Err(reason) => {
                report.warn(LoadWarning::SpawnOverrides {
                    path: path.to_path_buf(),
                    reason,
                });
                Self::default()
            }
        }
    }

    /// Entry for `map_path`, trying the full path, the file name and the
    /// path with forward slashes, in that order.
    pub fn lookup(&self, map_path: &Path) -> Option<SpawnOverride> {
        let full = map_path.to_string_lossy();
        let file_name = map_path.file_name().map(|f| f.to_string_lossy());
        let forward = full.replace('\\', "/");

        self.0
            .get(&*full)
            .or_else(|| file_name.and_then(|f| self.0.get(&*f)))
            .or_else(|| self.0.get(&forward))
            .copied()
    }
}
