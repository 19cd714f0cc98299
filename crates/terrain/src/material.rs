//! Material stratigraphy: which soil layer lies at a given depth below the
//! baseline surface, and how hard it is to dig through.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MaterialError {
    #[error("Stratigraphy needs at least one layer")]
    NoLayers,
    #[error("Layer '{name}' has invalid depth range {start}..{end}")]
    InvalidRange { name: String, start: f32, end: f32 },
}

/// A named soil layer occupying a depth range below the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialLayer {
    pub name: String,
    /// Depth where the layer begins (inclusive)
    pub depth_range_start: f32,
    /// Depth where the layer ends (exclusive)
    pub depth_range_end: f32,
    /// Resistance to excavation: 0.0 = loose, 1.0 = rock
    pub hardness: f32,
}

impl MaterialLayer {
    pub fn new(name: impl Into<String>, start: f32, end: f32, hardness: f32) -> Self {
        Self {
            name: name.into(),
            depth_range_start: start,
            depth_range_end: end,
            hardness: hardness.clamp(0.0, 1.0),
        }
    }

    #[inline]
    fn contains(&self, depth: f32) -> bool {
        depth >= self.depth_range_start && depth < self.depth_range_end
    }
}

/// Ordered, immutable list of layers from the surface downwards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialStratigraphy {
    layers: Vec<MaterialLayer>,
}

impl Default for MaterialStratigraphy {
    fn default() -> Self {
        Self {
            layers: vec![
                MaterialLayer::new("Topsoil", 0.0, 1.0, 0.1),
                MaterialLayer::new("Subsoil", 1.0, 3.0, 0.3),
                MaterialLayer::new("Clay", 3.0, 6.0, 0.5),
                MaterialLayer::new("Bedrock", 6.0, f32::MAX, 0.9),
            ],
        }
    }
}

impl MaterialStratigraphy {
    /// Build a stratigraphy, sorting layers by their starting depth
    pub fn new(mut layers: Vec<MaterialLayer>) -> Result<Self, MaterialError> {
        if layers.is_empty() {
            return Err(MaterialError::NoLayers);
        }
        for layer in &layers {
            if !(layer.depth_range_end > layer.depth_range_start) {
                return Err(MaterialError::InvalidRange {
                    name: layer.name.clone(),
                    start: layer.depth_range_start,
                    end: layer.depth_range_end,
                });
            }
        }
        layers.sort_by(|a, b| a.depth_range_start.total_cmp(&b.depth_range_start));
        Ok(Self { layers })
    }

    pub fn layers(&self) -> &[MaterialLayer] {
        &self.layers
    }

    /// Layer at `depth` below the baseline.
    ///
    /// Depths above the surface resolve to the top layer; depths past every
    /// range resolve to the deepest layer.
    pub fn material_at_depth(&self, depth: f32) -> &MaterialLayer {
        let top = &self.layers[0];
        if depth < top.depth_range_start {
            return top;
        }
        self.layers
            .iter()
            .find(|layer| layer.contains(depth))
            .unwrap_or_else(|| self.deepest())
    }

    fn deepest(&self) -> &MaterialLayer {
        // Non-empty by construction
        &self.layers[self.layers.len() - 1]
    }
}
