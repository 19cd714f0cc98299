//! Shared configuration for Earthworks
//!
//! This crate provides the single source of truth for terrain dimensions,
//! engine safety limits, and other settings shared between the terrain engine
//! and whatever host drives it (desktop sandbox, multiplayer server, tests).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default physical terrain width (x axis) in world units
pub const DEFAULT_WIDTH: f32 = 100.0;

/// Default physical terrain height (z axis) in world units
pub const DEFAULT_HEIGHT: f32 = 100.0;

/// Default number of grid segments along each axis
pub const DEFAULT_SEGMENTS: u32 = 100;

/// Default depth of the terrain block below the surface
pub const DEFAULT_MAX_DEPTH: f32 = 10.0;

/// Default maximum elevation above the surface
pub const DEFAULT_MAX_HEIGHT: f32 = 10.0;

/// Default number of undo snapshots retained
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Default cap on rasterized samples per precision operation
pub const DEFAULT_MAX_SAMPLES: usize = 10_000;

/// Default largest area extent (per axis) accepted by the executor
pub const DEFAULT_MAX_AREA_EXTENT: f32 = 100.0;

/// Default rasterization step in world units
pub const DEFAULT_SAMPLE_STEP: f32 = 1.0;

/// Default radius around the first polygon vertex that closes the polygon
pub const DEFAULT_CLOSE_CAPTURE_RADIUS: f32 = 1.0;

/// Default dirty-tracking tile edge, in samples
pub const DEFAULT_TILE_SIZE: u32 = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Terrain block dimensions and elevation limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Physical width along x
    pub width: f32,
    /// Physical height along z
    pub height: f32,
    /// Segments along x (samples = segments + 1)
    pub segments_x: u32,
    /// Segments along z (samples = segments + 1)
    pub segments_z: u32,
    /// Depth of the block below elevation 0
    pub max_depth: f32,
    /// Highest allowed elevation
    pub max_height: f32,
    /// Elevation every sample starts at
    pub initial_elevation: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            segments_x: DEFAULT_SEGMENTS,
            segments_z: DEFAULT_SEGMENTS,
            max_depth: DEFAULT_MAX_DEPTH,
            max_height: DEFAULT_MAX_HEIGHT,
            initial_elevation: 0.0,
        }
    }
}

impl TerrainConfig {
    /// Create a terrain config with the given size and segment counts
    pub fn new(width: f32, height: f32, segments_x: u32, segments_z: u32) -> Self {
        Self {
            width,
            height,
            segments_x,
            segments_z,
            ..Default::default()
        }
    }

    /// Sample spacing along x
    pub fn spacing_x(&self) -> f32 {
        self.width / self.segments_x as f32
    }

    /// Sample spacing along z
    pub fn spacing_z(&self) -> f32 {
        self.height / self.segments_z as f32
    }

    /// Lowest elevation a sample may reach (keeps 10% of the block floor)
    pub fn min_elevation(&self) -> f32 {
        -self.max_depth * 0.9
    }
}

/// Engine limits and interaction tolerances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of history snapshots retained
    pub history_limit: usize,
    /// Sample cap per precision operation (excess is truncated)
    pub max_samples: usize,
    /// Largest accepted area extent along either axis
    pub max_area_extent: f32,
    /// Rasterization step for area sampling
    pub sample_step: f32,
    /// Capture radius for closing a polygon on its first vertex
    pub close_capture_radius: f32,
    /// Dirty-tracking tile edge in samples
    pub tile_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            max_samples: DEFAULT_MAX_SAMPLES,
            max_area_extent: DEFAULT_MAX_AREA_EXTENT,
            sample_step: DEFAULT_SAMPLE_STEP,
            close_capture_radius: DEFAULT_CLOSE_CAPTURE_RADIUS,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

/// Root configuration record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarthworksConfig {
    pub terrain: TerrainConfig,
    pub engine: EngineConfig,
}

impl EarthworksConfig {
    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.terrain;
        let e = &self.engine;
        if t.segments_x == 0 || t.segments_z == 0 {
            return Err(invalid("terrain.segments", "must be at least 1"));
        }
        if !(t.width > 0.0) || !(t.height > 0.0) {
            return Err(invalid("terrain.size", "width and height must be positive"));
        }
        if t.max_depth < 0.0 || t.max_height < 0.0 {
            return Err(invalid("terrain.limits", "depth and height must not be negative"));
        }
        if e.history_limit == 0 {
            return Err(invalid("engine.history_limit", "must be at least 1"));
        }
        if !(e.sample_step > 0.0) {
            return Err(invalid("engine.sample_step", "must be positive"));
        }
        if e.tile_size == 0 {
            return Err(invalid("engine.tile_size", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
