/// Fraction of a layer's hardness that resists cutting (1 - hardness * this).
pub const HARDNESS_RESISTANCE: f32 = 0.3;

/// Normalized distance where the sharp falloff starts ramping down.
pub const SHARP_FALLOFF_KNEE: f32 = 0.8;

/// Minimum vertices before a polygon may be closed.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Minimum points before a polyline may be finished.
pub const MIN_POLYLINE_POINTS: usize = 2;

/// Dab spacing as a fraction of brush radius during strokes.
pub const DEFAULT_STROKE_SPACING: f32 = 0.25;

/// Schema version written into exported snapshots.
pub const SNAPSHOT_VERSION: u8 = 1;

/// Distances below this are treated as zero in geometric calculations.
pub const GEOMETRY_EPSILON: f32 = 1e-6;
