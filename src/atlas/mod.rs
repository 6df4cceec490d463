//! Tile-sheet pixels and the extruded atlas builder.

mod extrude;
mod pixels;

pub use extrude::{extrude_tiles, AtlasError, TileGeometry, MAX_ATLAS_SIDE};
pub use pixels::PixelBuffer;
