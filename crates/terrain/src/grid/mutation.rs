//! Grid mutation primitives.
//!
//! Precision operations write exact planned elevations through
//! [`HeightfieldGrid::set_elevation_exact`]; freehand brushes add weighted
//! deltas through [`HeightfieldGrid::blend_elevation`]. Both clamp to the
//! legal elevation range and mark the grid dirty.

use tracing::{debug, trace};

use super::{HeightfieldGrid, TerrainError};
use crate::types::GridIndex;

impl HeightfieldGrid {
    /// Set a sample's elevation, clamped to the legal range.
    /// Returns the elevation actually stored.
    pub fn set_elevation(&mut self, row: usize, col: usize, value: f32) -> Result<f32, TerrainError> {
        self.set_elevation_exact(GridIndex { row, col }, value)
    }

    /// Write a planned elevation verbatim (apart from range clamping)
    pub fn set_elevation_exact(&mut self, index: GridIndex, value: f32) -> Result<f32, TerrainError> {
        let offset = self.offset(index.row, index.col)?;
        let stored = self.clamp_elevation(value);
        self.elevations[offset] = stored;
        self.mark_dirty(index.row, index.col);
        Ok(stored)
    }

    /// Add a delta to a sample's elevation, clamped to the legal range.
    /// Returns the change actually applied.
    pub fn blend_elevation(&mut self, index: GridIndex, delta: f32) -> Result<f32, TerrainError> {
        let offset = self.offset(index.row, index.col)?;
        let old = self.elevations[offset];
        let stored = self.clamp_elevation(old + delta);
        self.elevations[offset] = stored;
        if stored != old {
            self.mark_dirty(index.row, index.col);
        }
        trace!(
            "blend_elevation: ({}, {}) {:.4} -> {:.4}",
            index.row, index.col, old, stored
        );
        Ok(stored - old)
    }

    /// Replace every elevation (undo/redo restore)
    pub fn restore_elevations(&mut self, elevations: &[f32]) -> Result<(), TerrainError> {
        if elevations.len() != self.elevations.len() {
            return Err(TerrainError::DimensionMismatch {
                expected: self.elevations.len(),
                actual: elevations.len(),
            });
        }
        self.elevations.copy_from_slice(elevations);
        self.mark_all_dirty();
        Ok(())
    }

    /// Copy the baseline back into every sample.
    ///
    /// History is owned by the session, which clears it alongside this call.
    pub fn reset_to_baseline(&mut self) {
        self.elevations.copy_from_slice(&self.baseline);
        self.mark_all_dirty();
        debug!("reset_to_baseline: {} samples restored", self.elevations.len());
    }

    /// Make the current surface the new baseline
    pub fn commit_baseline(&mut self) {
        self.baseline.copy_from_slice(&self.elevations);
        self.mark_all_dirty();
        debug!("commit_baseline: {} samples", self.baseline.len());
    }

    #[inline]
    fn clamp_elevation(&self, value: f32) -> f32 {
        let (min, max) = self.elevation_limits();
        value.clamp(min, max)
    }
}
