//! Read-only render adapter.
//!
//! Renderers depend on [`ElevationSource`], never on the grid's mutation
//! API. [`DisplayMesh`] triangulates exactly like the volume integrator, so
//! what is drawn is what is measured.

use glam::Vec2;

use crate::grid::{HeightfieldGrid, TileCoord};
use crate::types::GridIndex;
use crate::volume::cell_triangles;

/// Read access to a sampled surface.
///
/// Indices passed in are always within `(rows, cols)`.
pub trait ElevationSource {
    /// (rows, cols) of the sample lattice
    fn dimensions(&self) -> (usize, usize);
    /// World (x, z) of a sample
    fn position(&self, index: GridIndex) -> Vec2;
    fn elevation(&self, index: GridIndex) -> f32;
    /// How far the surface sits below its baseline (0 when filled)
    fn depth(&self, index: GridIndex) -> f32;
    /// Hardness of the exposed material
    fn hardness(&self, index: GridIndex) -> f32;
}

impl ElevationSource for HeightfieldGrid {
    fn dimensions(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    fn position(&self, index: GridIndex) -> Vec2 {
        self.sample_position(index)
    }

    fn elevation(&self, index: GridIndex) -> f32 {
        self.get_elevation(index.row, index.col).unwrap_or_default()
    }

    fn depth(&self, index: GridIndex) -> f32 {
        self.excavation_depth(index.row, index.col).unwrap_or_default()
    }

    fn hardness(&self, index: GridIndex) -> f32 {
        self.material_at(index.row, index.col)
            .map(|layer| layer.hardness)
            .unwrap_or_default()
    }
}

/// GPU-ready vertex
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct DisplayVertex {
    /// World (x, elevation, z)
    pub position: [f32; 3],
    pub depth: f32,
    pub hardness: f32,
}

/// Indexed triangle mesh of a rectangular block of samples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayMesh {
    pub vertices: Vec<DisplayVertex>,
    pub indices: Vec<u32>,
}

impl DisplayMesh {
    /// Mesh the whole surface
    pub fn from_source<S: ElevationSource + ?Sized>(source: &S) -> Self {
        let (rows, cols) = source.dimensions();
        Self::from_region(source, 0, 0, rows, cols)
    }

    /// Mesh the samples of one dirty tile plus the shared edge with the next
    /// tile, so neighbouring tile meshes meet without gaps.
    pub fn from_tile(grid: &HeightfieldGrid, coord: TileCoord) -> Self {
        let (row0, col0, rows, cols) = grid.get_tile_bounds(coord);
        let rows = (rows + 1).min(grid.rows().saturating_sub(row0));
        let cols = (cols + 1).min(grid.cols().saturating_sub(col0));
        Self::from_region(grid, row0, col0, rows, cols)
    }

    /// Mesh a `rows` by `cols` block starting at (row0, col0)
    pub fn from_region<S: ElevationSource + ?Sized>(
        source: &S,
        row0: usize,
        col0: usize,
        rows: usize,
        cols: usize,
    ) -> Self {
        let (total_rows, total_cols) = source.dimensions();
        let rows = rows.min(total_rows.saturating_sub(row0));
        let cols = cols.min(total_cols.saturating_sub(col0));

        let mut vertices = Vec::with_capacity(rows * cols);
        for row in row0..row0 + rows {
            for col in col0..col0 + cols {
                let index = GridIndex { row, col };
                let p = source.position(index);
                vertices.push(DisplayVertex {
                    position: [p.x, source.elevation(index), p.y],
                    depth: source.depth(index),
                    hardness: source.hardness(index),
                });
            }
        }

        let cells = rows.saturating_sub(1) * cols.saturating_sub(1);
        let mut indices = Vec::with_capacity(cells * 6);
        let local = |(row, col): (usize, usize)| ((row - row0) * cols + (col - col0)) as u32;
        for row in row0..(row0 + rows).saturating_sub(1) {
            for col in col0..(col0 + cols).saturating_sub(1) {
                for tri in cell_triangles(row, col) {
                    indices.extend(tri.map(&local));
                }
            }
        }

        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertices_as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn indices_as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
