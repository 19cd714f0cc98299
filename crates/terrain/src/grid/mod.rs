//! Heightfield grid with baseline tracking and dirty tiles

mod data_access;
mod dirty_tracking;
mod mutation;

use std::collections::HashSet;

use earthworks_config::{TerrainConfig, DEFAULT_TILE_SIZE};
use thiserror::Error;

use crate::material::MaterialStratigraphy;

pub use dirty_tracking::TileCoord;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TerrainError {
    #[error("Sample ({row}, {col}) outside {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("Elevation array has {actual} samples, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Invalid grid dimensions: {0}")]
    InvalidDimensions(String),
}

/// Rectangular elevation grid centered on the world origin.
///
/// Columns run along x, rows along z. A grid with `segments_x` by
/// `segments_z` segments holds `(segments_x + 1) * (segments_z + 1)` samples
/// stored row-major. Every sample carries a current elevation and the
/// baseline elevation volumes are measured against.
#[derive(Debug, Clone)]
pub struct HeightfieldGrid {
    pub(crate) config: TerrainConfig,
    rows: usize,
    cols: usize,
    pub(crate) elevations: Vec<f32>,
    pub(crate) baseline: Vec<f32>,
    pub(crate) stratigraphy: MaterialStratigraphy,
    pub(crate) tile_size: usize,
    tiles_x: usize,
    tiles_z: usize,
    pub(crate) dirty_tiles: HashSet<TileCoord>,
    pub(crate) revision: u64,
}

impl HeightfieldGrid {
    /// Create a flat grid with the default stratigraphy and tile size
    pub fn new(config: TerrainConfig) -> Result<Self, TerrainError> {
        Self::with_layout(
            config,
            MaterialStratigraphy::default(),
            DEFAULT_TILE_SIZE as usize,
        )
    }

    /// Create a flat grid with explicit stratigraphy and dirty-tile size
    pub fn with_layout(
        config: TerrainConfig,
        stratigraphy: MaterialStratigraphy,
        tile_size: usize,
    ) -> Result<Self, TerrainError> {
        if config.segments_x == 0 || config.segments_z == 0 {
            return Err(TerrainError::InvalidDimensions(
                "segment counts must be at least 1".to_string(),
            ));
        }
        if !(config.width > 0.0) || !(config.height > 0.0) {
            return Err(TerrainError::InvalidDimensions(format!(
                "size {}x{} must be positive",
                config.width, config.height
            )));
        }
        if !(config.max_depth >= 0.0) || !(config.max_height >= 0.0) {
            return Err(TerrainError::InvalidDimensions(format!(
                "depth {} and height {} limits must not be negative",
                config.max_depth, config.max_height
            )));
        }
        if tile_size == 0 {
            return Err(TerrainError::InvalidDimensions(
                "tile size must be at least 1".to_string(),
            ));
        }

        let cols = config.segments_x as usize + 1;
        let rows = config.segments_z as usize + 1;
        let initial = config
            .initial_elevation
            .clamp(config.min_elevation(), config.max_height);

        Ok(Self {
            rows,
            cols,
            elevations: vec![initial; rows * cols],
            baseline: vec![initial; rows * cols],
            stratigraphy,
            tile_size,
            tiles_x: cols.div_ceil(tile_size),
            tiles_z: rows.div_ceil(tile_size),
            dirty_tiles: HashSet::new(),
            revision: 0,
            config,
        })
    }

    /// Number of sample rows (along z)
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of sample columns (along x)
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of samples
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Terrain configuration the grid was built from
    #[inline]
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Soil layers below the baseline
    #[inline]
    pub fn stratigraphy(&self) -> &MaterialStratigraphy {
        &self.stratigraphy
    }

    /// Dirty-tracking tile edge in samples
    #[inline]
    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Number of tiles along x
    #[inline]
    pub fn tiles_x(&self) -> usize {
        self.tiles_x
    }

    /// Number of tiles along z
    #[inline]
    pub fn tiles_z(&self) -> usize {
        self.tiles_z
    }

    /// Legal elevation range `[-max_depth * 0.9, max_height]`
    #[inline]
    pub fn elevation_limits(&self) -> (f32, f32) {
        (self.config.min_elevation(), self.config.max_height)
    }
}
