//! Precision cut/fill operations
//!
//! A [`CutFillOperation`] is the fully specified result of the planning
//! workflow. [`OperationExecutor`] rasterizes it into per-sample deltas and
//! writes them straight into the grid with [`HeightfieldGrid::set_elevation_exact`].
//! Unlike brushes, precision operations never apply falloff or material
//! hardness.

use std::collections::BTreeMap;

use earthworks_config::{EngineConfig, DEFAULT_MAX_AREA_EXTENT, DEFAULT_MAX_SAMPLES, DEFAULT_SAMPLE_STEP};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::area::{DrawingArea, GeometryError};
use crate::cross_section::{CrossSectionConfig, CrossSectionProfile};
use crate::grid::{HeightfieldGrid, TerrainError};
use crate::history::{HistoryStack, TerrainSnapshot};
use crate::types::{Direction, GridIndex, VolumeSummary};
use crate::volume::VolumeAccountant;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Area is too small: {0}")]
    InsufficientGeometry(#[from] GeometryError),
    #[error("Area {extent_x:.1}x{extent_z:.1} exceeds the {limit:.1} unit safety limit")]
    AreaTooLarge {
        extent_x: f32,
        extent_z: f32,
        limit: f32,
    },
    #[error("Magnitude must be positive and finite, got {0}")]
    InvalidMagnitude(f32),
    #[error("Grid error: {0}")]
    Grid(#[from] TerrainError),
}

/// A complete cut or fill request
///
/// Immutable once built. Serializable so collaborators can log and replay
/// operations instead of raw grid diffs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutFillOperation {
    direction: Direction,
    magnitude: f32,
    area: DrawingArea,
    cross_section: CrossSectionConfig,
}

impl CutFillOperation {
    pub fn new(
        direction: Direction,
        magnitude: f32,
        area: DrawingArea,
        cross_section: CrossSectionConfig,
    ) -> Result<Self, ExecutionError> {
        let operation = Self {
            direction,
            magnitude,
            area,
            cross_section,
        };
        operation.validate()?;
        Ok(operation)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn magnitude(&self) -> f32 {
        self.magnitude
    }

    pub fn area(&self) -> &DrawingArea {
        &self.area
    }

    pub fn cross_section(&self) -> &CrossSectionConfig {
        &self.cross_section
    }

    /// Negative for cuts, positive for fills
    pub fn signed_magnitude(&self) -> f32 {
        self.direction.sign() * self.magnitude
    }

    /// Check magnitude and geometry
    pub fn validate(&self) -> Result<(), ExecutionError> {
        if !self.magnitude.is_finite() || self.magnitude <= 0.0 {
            return Err(ExecutionError::InvalidMagnitude(self.magnitude));
        }
        self.area.validate()?;
        Ok(())
    }
}

/// One planned write
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannedDelta {
    pub index: GridIndex,
    /// Signed elevation change for this sample
    pub delta: f32,
}

/// Deltas an operation would write, without touching the grid
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlannedEdit {
    /// One entry per affected grid sample, ordered by (row, col)
    pub deltas: Vec<PlannedDelta>,
    /// Points produced by rasterization before clipping and merging
    pub sampled: usize,
    /// Points that fell outside the grid
    pub clipped: usize,
    /// Rasterization hit the sample cap
    pub truncated: bool,
}

impl PlannedEdit {
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}

/// Rasterizes and applies [`CutFillOperation`]s
#[derive(Debug, Clone, Copy)]
pub struct OperationExecutor {
    max_samples: usize,
    max_area_extent: f32,
    sample_step: f32,
}

impl Default for OperationExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SAMPLES, DEFAULT_MAX_AREA_EXTENT, DEFAULT_SAMPLE_STEP)
    }
}

impl OperationExecutor {
    pub fn new(max_samples: usize, max_area_extent: f32, sample_step: f32) -> Self {
        Self {
            max_samples,
            max_area_extent,
            sample_step,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.max_samples, config.max_area_extent, config.sample_step)
    }

    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    pub fn max_area_extent(&self) -> f32 {
        self.max_area_extent
    }

    pub fn sample_step(&self) -> f32 {
        self.sample_step
    }

    /// Compute the per-sample deltas for an operation.
    ///
    /// Points outside the grid are skipped. When several points map to the
    /// same sample the delta with the largest magnitude is kept, so sampling
    /// finer than the grid spacing never deepens a cut.
    pub fn plan(&self, grid: &HeightfieldGrid, operation: &CutFillOperation) -> Result<PlannedEdit, ExecutionError> {
        operation.validate()?;

        let extent = operation.area().extent();
        if extent.x > self.max_area_extent || extent.y > self.max_area_extent {
            warn!(
                "plan: area {:.1}x{:.1} exceeds safety limit {:.1}, aborting",
                extent.x, extent.y, self.max_area_extent
            );
            return Err(ExecutionError::AreaTooLarge {
                extent_x: extent.x,
                extent_z: extent.y,
                limit: self.max_area_extent,
            });
        }

        let profile = CrossSectionProfile::new(operation.cross_section(), operation.area());
        let base = operation.signed_magnitude();

        let mut merged: BTreeMap<GridIndex, f32> = BTreeMap::new();
        let mut sampled = 0;
        let mut clipped = 0;

        let mut points = operation.area().sampled_points(self.sample_step)?;
        for point in points.by_ref().take(self.max_samples) {
            sampled += 1;
            let Some(index) = grid.world_to_nearest_sample(point.x, point.y) else {
                clipped += 1;
                continue;
            };
            let delta = profile.magnitude_at(point, base);
            merged
                .entry(index)
                .and_modify(|existing| {
                    if delta.abs() > existing.abs() {
                        *existing = delta;
                    }
                })
                .or_insert(delta);
        }
        let truncated = points.next().is_some();

        if truncated {
            warn!(
                "plan: sampling truncated at {} points, area only partially applied",
                self.max_samples
            );
        }
        if clipped > 0 {
            debug!("plan: {} points outside the terrain were skipped", clipped);
        }

        let deltas = merged
            .into_iter()
            .map(|(index, delta)| PlannedDelta { index, delta })
            .collect::<Vec<_>>();

        debug!(
            "plan: {:?} {:.3} {:?} -> {} samples from {} points",
            operation.direction(),
            operation.magnitude(),
            profile.wall_type(),
            deltas.len(),
            sampled
        );

        Ok(PlannedEdit {
            deltas,
            sampled,
            clipped,
            truncated,
        })
    }

    /// Apply an operation and commit one history snapshot.
    ///
    /// Planning completes before the first write, so a rejected operation
    /// leaves the grid, history and volumes untouched.
    pub fn execute(
        &self,
        operation: &CutFillOperation,
        grid: &mut HeightfieldGrid,
        history: &mut HistoryStack,
        volume: &mut VolumeAccountant,
    ) -> Result<VolumeSummary, ExecutionError> {
        let plan = self.plan(grid, operation)?;

        for planned in &plan.deltas {
            let current = grid.get_elevation(planned.index.row, planned.index.col)?;
            grid.set_elevation_exact(planned.index, current + planned.delta)?;
        }

        volume.invalidate();
        let summary = volume.volumes(grid);
        history.push(TerrainSnapshot::new(grid.elevations().to_vec(), summary));

        info!(
            "execute: {:?} {:.3} over {} samples -> cut={:.3}, fill={:.3}, net={:.3}",
            operation.direction(),
            operation.magnitude(),
            plan.deltas.len(),
            summary.cut,
            summary.fill,
            summary.net
        );

        Ok(summary)
    }
}
