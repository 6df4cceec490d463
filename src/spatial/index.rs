use macroquad::prelude::*;
use std::collections::HashMap;

use crate::compose::DrawInstance;

pub const CHUNK_SIZE: i32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

#[inline]
pub fn world_to_chunk(p: Vec2) -> ChunkCoord {
    ChunkCoord {
        x: (p.x.floor() as i32).div_euclid(CHUNK_SIZE),
        y: (p.y.floor() as i32).div_euclid(CHUNK_SIZE),
    }
}

/// Buckets draw instances by the chunk holding their top-left corner.
/// Buckets store instance indices in ascending (paint) order.
#[derive(Debug, Clone, Default)]
pub struct ChunkIndex {
    buckets: HashMap<ChunkCoord, Vec<u32>>,
}

impl ChunkIndex {
    pub fn build(instances: &[DrawInstance]) -> Self {
        let mut buckets: HashMap<ChunkCoord, Vec<u32>> = HashMap::new();
        for (i, inst) in instances.iter().enumerate() {
            buckets
                .entry(world_to_chunk(inst.dest))
                .or_default()
                .push(i as u32);
        }
        Self { buckets }
    }

    pub fn bucket(&self, coord: ChunkCoord) -> Option<&[u32]> {
        self.buckets.get(&coord).map(Vec::as_slice)
    }

    #[cfg(test)]
    pub fn chunk_count(&self) -> usize {
        self.buckets.len()
    }
}
