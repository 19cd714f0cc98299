//! Brush engine for freehand terrain sculpting
//!
//! Brushes add falloff-weighted height changes around a center point. Cutting
//! is resisted by the hardness of the material exposed at each sample; filling
//! is not. Brushes never snapshot history themselves: the session commits one
//! snapshot per logical user action.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{DEFAULT_STROKE_SPACING, HARDNESS_RESISTANCE, SHARP_FALLOFF_KNEE};
use crate::grid::{HeightfieldGrid, TerrainError};
use crate::types::{BrushTool, GridIndex, ModificationEvent};

/// Footprint shape of a brush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrushShape {
    /// Euclidean distance within radius
    #[default]
    Circle,
    /// Per-axis (Chebyshev) distance within radius
    Square,
}

/// Brush falloff curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FalloffCurve {
    /// strength = 1 - d
    Linear,
    /// strength = cos(d * pi / 2)
    #[default]
    Smooth,
    /// Full strength until the knee, then a linear ramp to zero
    Sharp,
}

impl FalloffCurve {
    /// Weight at a normalized distance (0.0 = center, 1.0 = edge)
    pub fn evaluate(&self, normalized_distance: f32) -> f32 {
        let d = normalized_distance.clamp(0.0, 1.0);
        match self {
            FalloffCurve::Linear => 1.0 - d,
            FalloffCurve::Smooth => (d * std::f32::consts::FRAC_PI_2).cos().max(0.0),
            FalloffCurve::Sharp => {
                if d <= SHARP_FALLOFF_KNEE {
                    1.0
                } else {
                    (1.0 - d) / (1.0 - SHARP_FALLOFF_KNEE)
                }
            }
        }
    }
}

/// Brush configuration owned by the tool selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    /// Footprint radius in world units
    pub radius: f32,
    /// Strength multiplier 0.0-1.0
    pub strength: f32,
    pub shape: BrushShape,
    pub falloff: FalloffCurve,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            radius: 3.0,
            strength: 0.5,
            shape: BrushShape::Circle,
            falloff: FalloffCurve::Smooth,
        }
    }
}

impl BrushSettings {
    pub fn new(radius: f32, strength: f32, shape: BrushShape, falloff: FalloffCurve) -> Self {
        Self {
            radius: radius.max(0.0),
            strength: strength.clamp(0.0, 1.0),
            shape,
            falloff,
        }
    }

    /// Normalized distance of an offset from the brush center
    #[inline]
    fn normalized_distance(&self, offset: Vec2) -> f32 {
        let distance = match self.shape {
            BrushShape::Circle => offset.length(),
            BrushShape::Square => offset.x.abs().max(offset.y.abs()),
        };
        distance / self.radius
    }
}

/// Result of one brush application
#[derive(Debug, Clone, PartialEq)]
pub struct BrushApplication {
    /// Event to rebroadcast to other participants
    pub event: ModificationEvent,
    /// Samples whose elevation actually changed
    pub samples_affected: usize,
}

/// Apply a falloff-weighted height change around `center`.
///
/// `delta = height_change * strength * falloff * resistance`, where
/// resistance is `1 - hardness * 0.3` when cutting and 1 when filling.
pub fn apply_brush(
    grid: &mut HeightfieldGrid,
    center: Vec2,
    height_change: f32,
    settings: &BrushSettings,
) -> Result<BrushApplication, TerrainError> {
    let event = ModificationEvent {
        x: center.x,
        z: center.y,
        height_delta: height_change,
        tool: BrushTool::from_height_change(height_change),
    };

    if settings.radius <= 0.0 || settings.strength <= 0.0 || height_change == 0.0 {
        debug!("apply_brush: skipped (radius, strength or height change is zero)");
        return Ok(BrushApplication {
            event,
            samples_affected: 0,
        });
    }

    let Some((rows, cols)) = footprint_ranges(grid, center, settings.radius) else {
        debug!("apply_brush: ({:.2}, {:.2}) outside terrain", center.x, center.y);
        return Ok(BrushApplication {
            event,
            samples_affected: 0,
        });
    };

    let cutting = height_change < 0.0;
    let mut samples_affected = 0;

    for row in rows {
        for col in cols.clone() {
            let index = GridIndex { row, col };
            let offset = grid.sample_position(index) - center;
            let d = settings.normalized_distance(offset);
            if d > 1.0 {
                continue;
            }

            let weight = settings.falloff.evaluate(d);
            let resistance = if cutting {
                1.0 - grid.material_at(row, col)?.hardness * HARDNESS_RESISTANCE
            } else {
                1.0
            };

            let delta = height_change * settings.strength * weight * resistance;
            if delta == 0.0 {
                continue;
            }
            if grid.blend_elevation(index, delta)? != 0.0 {
                samples_affected += 1;
            }
        }
    }

    debug!(
        "apply_brush: center=({:.2}, {:.2}), change={:.3}, radius={:.2}, {:?}/{:?} -> {} samples",
        center.x, center.y, height_change, settings.radius, settings.shape, settings.falloff, samples_affected
    );

    Ok(BrushApplication {
        event,
        samples_affected,
    })
}

/// Row and column ranges covering a square of half-size `radius`
fn footprint_ranges(
    grid: &HeightfieldGrid,
    center: Vec2,
    radius: f32,
) -> Option<(std::ops::RangeInclusive<usize>, std::ops::RangeInclusive<usize>)> {
    let (min, max) = grid.world_bounds();
    let lo = (center - Vec2::splat(radius)).max(min);
    let hi = (center + Vec2::splat(radius)).min(max);
    if lo.x > hi.x || lo.y > hi.y {
        return None;
    }

    let spacing = Vec2::new(grid.config().spacing_x(), grid.config().spacing_z());
    let first = ((lo - min) / spacing).floor();
    let last = ((hi - min) / spacing).ceil();

    let col_end = (last.x as usize).min(grid.cols() - 1);
    let row_end = (last.y as usize).min(grid.rows() - 1);
    Some((first.y as usize..=row_end, first.x as usize..=col_end))
}

/// Brush engine that turns pointer motion into evenly spaced dabs
///
/// The engine interpolates between input points based on the spacing
/// setting, so a fast drag paints a continuous trail.
#[derive(Debug, Clone)]
pub struct BrushEngine {
    settings: BrushSettings,
    /// Dab spacing as a fraction of radius
    spacing: f32,
    /// Last position (None if stroke not started)
    last_pos: Option<Vec2>,
    /// Accumulated distance since last dab
    distance_accumulator: f32,
}

impl Default for BrushEngine {
    fn default() -> Self {
        Self::new(BrushSettings::default())
    }
}

impl BrushEngine {
    pub fn new(settings: BrushSettings) -> Self {
        Self {
            settings,
            spacing: DEFAULT_STROKE_SPACING,
            last_pos: None,
            distance_accumulator: 0.0,
        }
    }

    pub fn settings(&self) -> &BrushSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: BrushSettings) {
        self.settings = settings;
    }

    /// Set dab spacing as a fraction of radius
    pub fn set_spacing(&mut self, spacing: f32) {
        self.spacing = spacing.max(0.01);
    }

    /// Apply the current settings at a single point
    pub fn apply(
        &self,
        grid: &mut HeightfieldGrid,
        center_x: f32,
        center_z: f32,
        height_change: f32,
    ) -> Result<BrushApplication, TerrainError> {
        apply_brush(grid, Vec2::new(center_x, center_z), height_change, &self.settings)
    }

    /// Start a new stroke
    pub fn begin_stroke(&mut self) {
        self.last_pos = None;
        self.distance_accumulator = 0.0;
    }

    /// Advance the stroke to `pos`, returning the dab centers to apply
    pub fn stroke_to(&mut self, pos: Vec2) -> Vec<Vec2> {
        let Some(last) = self.last_pos else {
            self.last_pos = Some(pos);
            self.distance_accumulator = 0.0;
            return vec![pos];
        };

        let travel = pos - last;
        let distance = travel.length();
        if distance < 0.001 {
            return Vec::new();
        }

        let spacing_distance = self.settings.radius * self.spacing;
        if spacing_distance < 0.001 {
            self.last_pos = Some(pos);
            return vec![pos];
        }

        let mut dabs = Vec::new();
        let mut next = (spacing_distance - self.distance_accumulator).max(0.0);
        let mut last_dab = None;
        while next <= distance {
            dabs.push(last + travel * (next / distance));
            last_dab = Some(next);
            next += spacing_distance;
        }

        self.distance_accumulator = match last_dab {
            Some(at) => distance - at,
            None => self.distance_accumulator + distance,
        };
        self.last_pos = Some(pos);
        dabs
    }

    /// End the current stroke
    pub fn end_stroke(&mut self) {
        self.last_pos = None;
        self.distance_accumulator = 0.0;
    }

    /// Check if a stroke is in progress
    pub fn is_stroking(&self) -> bool {
        self.last_pos.is_some()
    }
}
