//! Cross-section profiles: how an operation's depth tapers across its area

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::area::DrawingArea;
use crate::constants::GEOMETRY_EPSILON;

/// Lateral wall profile of a cut or fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WallType {
    /// Uniform depth everywhere in the area
    #[default]
    Straight,
    /// Cosine bowl (cut) or mound (fill) around the deepest point
    Curved,
    /// Linear 45 degree taper around the deepest point
    Angled,
}

impl WallType {
    /// Whether the workflow must ask for a deepest point
    pub fn needs_deepest_point(self) -> bool {
        !matches!(self, WallType::Straight)
    }
}

/// Wall type plus the point where the profile reaches full magnitude
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CrossSectionConfig {
    pub wall_type: WallType,
    /// Required for tapered walls; ignored for straight ones
    pub deepest_point: Option<Vec2>,
}

impl CrossSectionConfig {
    pub fn straight() -> Self {
        Self::default()
    }

    pub fn tapered(wall_type: WallType, deepest_point: Vec2) -> Self {
        Self {
            wall_type,
            deepest_point: Some(deepest_point),
        }
    }
}

/// Profile evaluator bound to one area.
///
/// Pure and order independent: every sample can be evaluated in isolation.
#[derive(Debug, Clone, Copy)]
pub struct CrossSectionProfile {
    wall_type: WallType,
    deepest_point: Vec2,
    half_extent: f32,
}

impl CrossSectionProfile {
    /// Bind a cross-section to an area. A tapered profile with no deepest
    /// point falls back to the area centroid.
    pub fn new(config: &CrossSectionConfig, area: &DrawingArea) -> Self {
        Self {
            wall_type: config.wall_type,
            deepest_point: config.deepest_point.unwrap_or_else(|| area.centroid()),
            half_extent: area.half_extent(),
        }
    }

    pub fn wall_type(&self) -> WallType {
        self.wall_type
    }

    /// Signed magnitude at `point` for a signed base magnitude
    pub fn magnitude_at(&self, point: Vec2, base_magnitude: f32) -> f32 {
        let distance = point.distance(self.deepest_point);
        profile_magnitude(self.wall_type, distance, self.half_extent, base_magnitude)
    }
}

/// Effective magnitude at `point` for an operation over `area`
pub fn effective_magnitude(
    point: Vec2,
    area: &DrawingArea,
    deepest_point: Vec2,
    wall_type: WallType,
    base_magnitude: f32,
) -> f32 {
    profile_magnitude(
        wall_type,
        point.distance(deepest_point),
        area.half_extent(),
        base_magnitude,
    )
}

/// Taper a magnitude by distance from the deepest point.
///
/// The taper works on `|base_magnitude|` and restores the sign afterwards, so
/// cuts and fills share one curve and the result never exceeds the base.
pub fn profile_magnitude(wall_type: WallType, distance: f32, half_extent: f32, base_magnitude: f32) -> f32 {
    let sign = base_magnitude.signum();
    let base = base_magnitude.abs();
    let distance = distance.max(0.0);

    let magnitude = match wall_type {
        WallType::Straight => base,
        WallType::Curved => {
            if half_extent < GEOMETRY_EPSILON {
                if distance < GEOMETRY_EPSILON { base } else { 0.0 }
            } else {
                let angle = (distance / half_extent) * std::f32::consts::FRAC_PI_2;
                if angle >= std::f32::consts::FRAC_PI_2 {
                    0.0
                } else {
                    (base * angle.cos()).clamp(0.0, base)
                }
            }
        }
        WallType::Angled => {
            // Run of a 45 degree wall equals its rise
            let run = base * std::f32::consts::FRAC_PI_4.tan();
            if run < GEOMETRY_EPSILON {
                0.0
            } else {
                base * (1.0 - distance / run).max(0.0)
            }
        }
    };

    sign * magnitude
}
