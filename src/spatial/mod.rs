mod collision;
mod index;

pub use collision::{point_in_polygon, rect_contains, CollisionIndex, NonWalkableRegion, Polygon};
pub use index::{ChunkCoord, ChunkIndex, CHUNK_SIZE};
