use crate::spatial::{ChunkCoord, ChunkIndex, CHUNK_SIZE};
use macroquad::prelude::*;

const CULL_MARGIN_CHUNKS: i32 = 1;

pub fn visible_chunk_coords_rect(view_min: Vec2, view_max: Vec2) -> Vec<ChunkCoord> {
    let mut cx_min = (view_min.x.floor() as i32).div_euclid(CHUNK_SIZE);
    let mut cy_min = (view_min.y.floor() as i32).div_euclid(CHUNK_SIZE);
    let mut cx_max = (view_max.x.floor() as i32).div_euclid(CHUNK_SIZE);
    let mut cy_max = (view_max.y.floor() as i32).div_euclid(CHUNK_SIZE);

    if cx_min > cx_max {
        std::mem::swap(&mut cx_min, &mut cx_max);
    }
    if cy_min > cy_max {
        std::mem::swap(&mut cy_min, &mut cy_max);
    }

    //pad by one chunk, tiles hang over their chunk edge
    cx_min -= CULL_MARGIN_CHUNKS;
    cy_min -= CULL_MARGIN_CHUNKS;
    cx_max += CULL_MARGIN_CHUNKS;
    cy_max += CULL_MARGIN_CHUNKS;

    let mut coords = Vec::new();
    for cy in cy_min..=cy_max {
        for cx in cx_min..=cx_max {
            coords.push(ChunkCoord { x: cx, y: cy });
        }
    }
    coords
}

/// Indices of instances in chunks overlapping the view, in paint order.
pub fn query_visible_rect(index: &ChunkIndex, view_min: Vec2, view_max: Vec2) -> Vec<usize> {
    let mut out: Vec<usize> = visible_chunk_coords_rect(view_min, view_max)
        .into_iter()
        .filter_map(|c| index.bucket(c))
        .flatten()
        .map(|&i| i as usize)
        .collect();
    // buckets are disjoint, so sorting restores global paint order
    out.sort_unstable();
    out
}
