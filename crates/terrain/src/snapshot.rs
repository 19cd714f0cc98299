//! Export/import of a whole terrain for persistence collaborators

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::constants::SNAPSHOT_VERSION;
use crate::grid::{HeightfieldGrid, TerrainError};
use crate::history::now_ms;
use crate::material::{MaterialError, MaterialLayer, MaterialStratigraphy};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Grid error: {0}")]
    Grid(#[from] TerrainError),
    #[error("Material error: {0}")]
    Material(#[from] MaterialError),
    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u8),
}

/// Serializable terrain state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainExport {
    pub version: u8,
    pub elevations: Vec<f32>,
    pub baseline: Vec<f32>,
    pub material_layers: Vec<MaterialLayer>,
    pub grid_width: f32,
    pub grid_height: f32,
    pub segments_x: u32,
    pub segments_z: u32,
    pub timestamp_ms: u64,
}

impl TerrainExport {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let export: Self = serde_json::from_str(json)?;
        if export.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(export.version));
        }
        Ok(export)
    }
}

impl HeightfieldGrid {
    /// Capture elevation, baseline and stratigraphy
    pub fn export(&self) -> TerrainExport {
        TerrainExport {
            version: SNAPSHOT_VERSION,
            elevations: self.elevations.clone(),
            baseline: self.baseline.clone(),
            material_layers: self.stratigraphy.layers().to_vec(),
            grid_width: self.config.width,
            grid_height: self.config.height,
            segments_x: self.config.segments_x,
            segments_z: self.config.segments_z,
            timestamp_ms: now_ms(),
        }
    }

    /// Replace this grid's state with an export of the same layout.
    ///
    /// Everything is validated before the first write; on error the grid is
    /// unchanged.
    pub fn import(&mut self, export: &TerrainExport) -> Result<(), SnapshotError> {
        if export.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(export.version));
        }
        if export.segments_x != self.config.segments_x
            || export.segments_z != self.config.segments_z
            || export.grid_width != self.config.width
            || export.grid_height != self.config.height
        {
            return Err(TerrainError::InvalidDimensions(format!(
                "snapshot is {}x{} units with {}x{} segments, grid is {}x{} with {}x{}",
                export.grid_width,
                export.grid_height,
                export.segments_x,
                export.segments_z,
                self.config.width,
                self.config.height,
                self.config.segments_x,
                self.config.segments_z
            ))
            .into());
        }
        for values in [&export.elevations, &export.baseline] {
            if values.len() != self.sample_count() {
                return Err(TerrainError::DimensionMismatch {
                    expected: self.sample_count(),
                    actual: values.len(),
                }
                .into());
            }
        }
        let stratigraphy = MaterialStratigraphy::new(export.material_layers.clone())?;

        let (min, max) = self.elevation_limits();
        for (dst, &src) in self.elevations.iter_mut().zip(&export.elevations) {
            *dst = src.clamp(min, max);
        }
        self.baseline.copy_from_slice(&export.baseline);
        self.stratigraphy = stratigraphy;
        self.mark_all_dirty();

        info!(
            "import: {} samples, {} layers",
            self.sample_count(),
            self.stratigraphy.layers().len()
        );
        debug!("import: snapshot taken at {}", export.timestamp_ms);
        Ok(())
    }
}
