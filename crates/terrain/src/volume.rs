//! Cut/fill volume accounting against the baseline surface.
//!
//! The grid is triangulated with two triangles per cell. Each triangle
//! contributes its planar area times the mean height delta of its three
//! vertices, so samples on the boundary (which touch fewer triangles) are
//! weighted by the area they actually support.

use glam::DVec2;
use tracing::trace;

use crate::grid::HeightfieldGrid;
use crate::types::VolumeSummary;

/// Caching wrapper around [`compute_volumes`].
///
/// The cache is keyed by the grid revision, so any mutation through the grid
/// API invalidates it automatically.
#[derive(Debug, Default, Clone)]
pub struct VolumeAccountant {
    cached: Option<(u64, VolumeSummary)>,
}

impl VolumeAccountant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Volumes for the grid's current state, recomputed only if it changed
    pub fn volumes(&mut self, grid: &HeightfieldGrid) -> VolumeSummary {
        if let Some((revision, summary)) = self.cached {
            if revision == grid.revision() {
                return summary;
            }
        }
        let summary = compute_volumes(grid);
        self.cached = Some((grid.revision(), summary));
        summary
    }

    /// Drop the cached result
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Whether a result is cached for the given grid state
    pub fn is_cached_for(&self, grid: &HeightfieldGrid) -> bool {
        matches!(self.cached, Some((revision, _)) if revision == grid.revision())
    }
}

/// Integrate cut and fill over the grid triangulation
pub fn compute_volumes(grid: &HeightfieldGrid) -> VolumeSummary {
    let cols = grid.cols();
    let rows = grid.rows();
    let spacing_x = grid.config().spacing_x() as f64;
    let spacing_z = grid.config().spacing_z() as f64;
    let elevations = grid.elevations();
    let baseline = grid.baseline();

    let delta = |row: usize, col: usize| -> f64 {
        let offset = row * cols + col;
        elevations[offset] as f64 - baseline[offset] as f64
    };
    let position = |row: usize, col: usize| DVec2::new(col as f64 * spacing_x, row as f64 * spacing_z);

    let mut cut = 0.0f64;
    let mut fill = 0.0f64;

    for row in 0..rows.saturating_sub(1) {
        for col in 0..cols.saturating_sub(1) {
            for tri in cell_triangles(row, col) {
                let [a, b, c] = tri;
                let area = triangle_area(position(a.0, a.1), position(b.0, b.1), position(c.0, c.1));
                let mean = (delta(a.0, a.1) + delta(b.0, b.1) + delta(c.0, c.1)) / 3.0;
                let volume = area * mean;
                if volume > 0.0 {
                    fill += volume;
                } else if volume < 0.0 {
                    cut += -volume;
                }
            }
        }
    }

    trace!("compute_volumes: cut={:.4}, fill={:.4}", cut, fill);
    VolumeSummary::new(cut, fill)
}

/// The two triangles of the cell whose lower-left sample is (row, col),
/// as (row, col) vertex triples. Shared with the display mesh.
#[inline]
pub fn cell_triangles(row: usize, col: usize) -> [[(usize, usize); 3]; 2] {
    [
        [(row, col), (row + 1, col), (row, col + 1)],
        [(row + 1, col), (row + 1, col + 1), (row, col + 1)],
    ]
}

/// Planar triangle area from the cross product of two edges
#[inline]
fn triangle_area(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    0.5 * (b - a).perp_dot(c - a).abs()
}
