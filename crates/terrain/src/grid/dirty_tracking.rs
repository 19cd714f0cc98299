//! Dirty tile tracking for incremental re-meshing and cache invalidation

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::HeightfieldGrid;

/// Tile coordinates (x along columns, z along rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: usize,
    pub z: usize,
}

impl HeightfieldGrid {
    /// Mark the tile holding a sample as modified and bump the revision
    #[inline]
    pub(crate) fn mark_dirty(&mut self, row: usize, col: usize) {
        if row >= self.rows() || col >= self.cols() {
            return;
        }
        self.dirty_tiles.insert(TileCoord {
            x: col / self.tile_size,
            z: row / self.tile_size,
        });
        self.revision = self.revision.wrapping_add(1);
    }

    /// Mark every tile as modified (full rewrites such as undo or reset)
    pub(crate) fn mark_all_dirty(&mut self) {
        for z in 0..self.tiles_z() {
            for x in 0..self.tiles_x() {
                self.dirty_tiles.insert(TileCoord { x, z });
            }
        }
        self.revision = self.revision.wrapping_add(1);
        trace!("mark_all_dirty: {} tiles", self.dirty_tiles.len());
    }

    /// Get all dirty tiles (sorted) and clear the dirty set
    pub fn take_dirty_tiles(&mut self) -> Vec<TileCoord> {
        let mut tiles: Vec<TileCoord> = self.dirty_tiles.drain().collect();
        tiles.sort();
        tiles
    }

    /// Check if any tiles are dirty
    #[inline]
    pub fn has_dirty_tiles(&self) -> bool {
        !self.dirty_tiles.is_empty()
    }

    /// Get the number of dirty tiles
    #[inline]
    pub fn dirty_tile_count(&self) -> usize {
        self.dirty_tiles.len()
    }

    /// Mutation counter; changes whenever any elevation or baseline changes
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
