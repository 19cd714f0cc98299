use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Whether an operation removes or adds material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Cut,
    Fill,
}

impl Direction {
    /// Sign applied to a positive magnitude (-1 for cut, +1 for fill)
    pub fn sign(self) -> f32 {
        match self {
            Direction::Cut => -1.0,
            Direction::Fill => 1.0,
        }
    }
}

/// Freehand tool that produced a modification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BrushTool {
    #[default]
    Raise,
    Lower,
}

impl BrushTool {
    /// Tool implied by the sign of a height change
    pub fn from_height_change(height_change: f32) -> Self {
        if height_change < 0.0 {
            BrushTool::Lower
        } else {
            BrushTool::Raise
        }
    }
}

/// Integer address of a grid sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridIndex {
    pub row: usize,
    pub col: usize,
}

impl GridIndex {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Cut, fill and net volume relative to the baseline, in cubic world units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VolumeSummary {
    pub cut: f64,
    pub fill: f64,
    pub net: f64,
}

impl VolumeSummary {
    /// Build a summary from cut and fill totals (net = fill - cut)
    pub fn new(cut: f64, fill: f64) -> Self {
        Self {
            cut,
            fill,
            net: fill - cut,
        }
    }

    /// Whether every component is zero
    pub fn is_zero(&self) -> bool {
        self.cut == 0.0 && self.fill == 0.0 && self.net == 0.0
    }
}

/// A single brush application, rebroadcast to other participants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModificationEvent {
    pub x: f32,
    pub z: f32,
    pub height_delta: f32,
    pub tool: BrushTool,
}

impl ModificationEvent {
    /// World position of the brush center
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.z)
    }
}
