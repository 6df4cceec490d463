use std::path::Path;

use serde::Deserialize;

use crate::error::MapError;

/// Knobs for [`MapModel::load`](crate::MapModel::load).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Border pixels duplicated around every atlas tile. `0` keeps the
    /// atlas layout but still repacks it without spacing/margin.
    pub extrude: u32,
    /// File name of the spawn override sidecar, looked up next to the map.
    pub spawn_overrides_file: Option<String>,
    /// Follow `source` references to external JSON tilesets.
    pub resolve_external_tilesets: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            extrude: 1,
            spawn_overrides_file: Some("spawn_overrides.json".to_owned()),
            resolve_external_tilesets: true,
        }
    }
}

impl LoadOptions {
    /// Read options from a JSON file. Missing fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let txt = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&txt).map_err(|source| MapError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}
