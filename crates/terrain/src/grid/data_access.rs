//! Bounds-checked sample access and world/grid coordinate conversion

use glam::Vec2;

use super::{HeightfieldGrid, TerrainError};
use crate::material::MaterialLayer;
use crate::types::GridIndex;

impl HeightfieldGrid {
    /// Row-major offset of a sample, or a bounds error
    #[inline]
    pub fn offset(&self, row: usize, col: usize) -> Result<usize, TerrainError> {
        if row >= self.rows() || col >= self.cols() {
            return Err(TerrainError::OutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        Ok(row * self.cols() + col)
    }

    /// Current elevation of a sample
    pub fn get_elevation(&self, row: usize, col: usize) -> Result<f32, TerrainError> {
        let offset = self.offset(row, col)?;
        Ok(self.elevations[offset])
    }

    /// Baseline elevation of a sample
    pub fn get_baseline(&self, row: usize, col: usize) -> Result<f32, TerrainError> {
        let offset = self.offset(row, col)?;
        Ok(self.baseline[offset])
    }

    /// How far a sample has been dug below its baseline (0 for filled samples)
    pub fn excavation_depth(&self, row: usize, col: usize) -> Result<f32, TerrainError> {
        let offset = self.offset(row, col)?;
        Ok((self.baseline[offset] - self.elevations[offset]).max(0.0))
    }

    /// Material layer currently exposed at a sample
    pub fn material_at(&self, row: usize, col: usize) -> Result<&MaterialLayer, TerrainError> {
        let depth = self.excavation_depth(row, col)?;
        Ok(self.stratigraphy.material_at_depth(depth))
    }

    /// World (x, z) position of a sample
    pub fn sample_position(&self, index: GridIndex) -> Vec2 {
        Vec2::new(
            -self.config.width * 0.5 + index.col as f32 * self.config.spacing_x(),
            -self.config.height * 0.5 + index.row as f32 * self.config.spacing_z(),
        )
    }

    /// Nearest sample to a world position, or None if the position lies
    /// outside the terrain footprint.
    ///
    /// Spacing is uniform per axis, so this is direct index math.
    pub fn world_to_nearest_sample(&self, x: f32, z: f32) -> Option<GridIndex> {
        let col = ((x + self.config.width * 0.5) / self.config.spacing_x()).round();
        let row = ((z + self.config.height * 0.5) / self.config.spacing_z()).round();
        if !col.is_finite() || !row.is_finite() || col < 0.0 || row < 0.0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        Some(GridIndex { row, col })
    }

    /// World-space (min, max) corners of the terrain footprint
    pub fn world_bounds(&self) -> (Vec2, Vec2) {
        let half = Vec2::new(self.config.width * 0.5, self.config.height * 0.5);
        (-half, half)
    }

    /// All current elevations, row-major
    #[inline]
    pub fn elevations(&self) -> &[f32] {
        &self.elevations
    }

    /// All baseline elevations, row-major
    #[inline]
    pub fn baseline(&self) -> &[f32] {
        &self.baseline
    }

    /// Elevation data as raw bytes (for GPU height texture upload)
    pub fn elevations_as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.elevations)
    }

    /// Tile bounds (row, col, rows, cols) in sample coordinates.
    /// Edge tiles may be smaller than the tile size.
    pub fn get_tile_bounds(&self, coord: super::TileCoord) -> (usize, usize, usize, usize) {
        let row0 = coord.z * self.tile_size;
        let col0 = coord.x * self.tile_size;
        let rows = self.tile_size.min(self.rows().saturating_sub(row0));
        let cols = self.tile_size.min(self.cols().saturating_sub(col0));
        (row0, col0, rows, cols)
    }
}
