//! Closed polygon areas with even-odd containment

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::GeometryError;
use crate::constants::{GEOMETRY_EPSILON, MIN_POLYGON_VERTICES};

/// Outcome of a terrain click while drawing a polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonClick {
    Appended,
    Closed,
}

/// Ordered (x, z) vertex list, closed once the user clicks back on vertex 0
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<Vec2>,
    closed: bool,
}

impl Polygon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a closed polygon directly from vertices
    pub fn from_vertices(vertices: Vec<Vec2>) -> Result<Self, GeometryError> {
        let mut polygon = Self {
            vertices,
            closed: false,
        };
        polygon.close()?;
        Ok(polygon)
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Append a vertex to an open polygon
    pub fn add_vertex(&mut self, vertex: Vec2) -> Result<(), GeometryError> {
        if self.closed {
            return Err(GeometryError::AlreadyClosed);
        }
        self.vertices.push(vertex);
        Ok(())
    }

    /// Close the polygon; needs at least three vertices
    pub fn close(&mut self) -> Result<(), GeometryError> {
        if self.closed {
            return Err(GeometryError::AlreadyClosed);
        }
        if self.vertices.len() < MIN_POLYGON_VERTICES {
            return Err(GeometryError::TooFewVertices {
                required: MIN_POLYGON_VERTICES,
                actual: self.vertices.len(),
            });
        }
        self.closed = true;
        Ok(())
    }

    /// Handle a drawing click: a click within `capture_radius` of vertex 0
    /// closes the polygon once it has enough vertices, anything else appends.
    pub fn handle_click(&mut self, point: Vec2, capture_radius: f32) -> Result<PolygonClick, GeometryError> {
        if self.closed {
            return Err(GeometryError::AlreadyClosed);
        }
        let near_start = self
            .vertices
            .first()
            .is_some_and(|first| first.distance(point) <= capture_radius);
        if near_start && self.vertices.len() >= MIN_POLYGON_VERTICES {
            self.closed = true;
            return Ok(PolygonClick::Closed);
        }
        self.vertices.push(point);
        Ok(PolygonClick::Appended)
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.vertices.len() < MIN_POLYGON_VERTICES {
            return Err(GeometryError::TooFewVertices {
                required: MIN_POLYGON_VERTICES,
                actual: self.vertices.len(),
            });
        }
        if !self.closed {
            return Err(GeometryError::NotClosed);
        }
        Ok(())
    }

    /// Even-odd ray casting: count edges crossed by a ray towards +x
    pub fn contains(&self, point: Vec2) -> bool {
        let n = self.vertices.len();
        if n < MIN_POLYGON_VERTICES {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let vi = self.vertices[i];
            let vj = self.vertices[j];
            if (vi.y > point.y) != (vj.y > point.y) {
                let x_at = (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x;
                if point.x < x_at {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Grid of points over the bounding box, filtered by containment
    pub fn sampled_points(&self, step: f32) -> impl Iterator<Item = Vec2> + '_ {
        let (min, max) = self
            .vertices
            .iter()
            .fold((Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let counts = if self.vertices.is_empty() {
            None
        } else {
            let span = (max - min) / step;
            Some((
                (span.x + GEOMETRY_EPSILON).floor() as usize,
                (span.y + GEOMETRY_EPSILON).floor() as usize,
            ))
        };

        counts
            .into_iter()
            .flat_map(move |(nx, nz)| {
                (0..=nz).flat_map(move |j| {
                    (0..=nx).map(move |i| Vec2::new(min.x + i as f32 * step, min.y + j as f32 * step))
                })
            })
            .filter(move |p| self.contains(*p))
    }
}
