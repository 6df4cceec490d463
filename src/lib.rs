#![warn(missing_docs)]

//! Tiled JSON (TMJ) map loading for Macroquad: extruded tileset atlases,
//! composited draw instances, typed gameplay objects and collision queries.

mod atlas;
mod compose;
mod config;
mod error;
mod gid;
mod ir_map;
mod loader;
mod map;
mod objects;
mod render;
mod spatial;
mod tileset;

pub use atlas::{extrude_tiles, AtlasError, PixelBuffer, TileGeometry, MAX_ATLAS_SIDE};
pub use compose::{opacity_to_alpha, DrawInstance};
pub use config::LoadOptions;
pub use error::{LoadReport, LoadWarning, MapError};
pub use gid::{ResolvedTile, TileId};
pub use ir_map::{Properties, PropertyValue};
pub use loader::spawn_overrides::SpawnOverride;
pub use map::MapModel;
pub use objects::{
    parse_color, DecorativeActor, EntranceTrigger, HAlign, InteractionPoint, MinigameTrigger,
    SeatKind, SeatObject, TextLabel, VAlign,
};
pub use render::MapRenderer;
pub use spatial::{point_in_polygon, rect_contains, CollisionIndex, NonWalkableRegion, Polygon};
pub use tileset::Tileset;
