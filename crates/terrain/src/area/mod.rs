//! Drawing areas for precision operations
//!
//! A [`DrawingArea`] is either a closed polygon or a polyline with thickness.
//! Both rasterize to a lazy stream of world (x, z) sample points through
//! [`DrawingArea::sampled_points`], so the executor never needs to know which
//! representation it is working with.

mod polygon;
mod polyline;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use polygon::{Polygon, PolygonClick};
pub use polyline::Polyline;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Polygon needs at least {required} vertices, has {actual}")]
    TooFewVertices { required: usize, actual: usize },
    #[error("Polyline needs at least {required} points, has {actual}")]
    TooFewPoints { required: usize, actual: usize },
    #[error("Polygon is not closed")]
    NotClosed,
    #[error("Polygon is already closed")]
    AlreadyClosed,
    #[error("Invalid polyline thickness: {0}")]
    InvalidThickness(f32),
    #[error("Invalid sample step: {0}")]
    InvalidStep(f32),
}

/// How the user is drawing the operation area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AreaMode {
    Polygon,
    Polyline { thickness: f32 },
}

/// The area an operation applies to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawingArea {
    Polygon(Polygon),
    Polyline(Polyline),
}

impl DrawingArea {
    /// Start an empty area for the given mode
    pub fn empty(mode: AreaMode) -> Self {
        match mode {
            AreaMode::Polygon => DrawingArea::Polygon(Polygon::new()),
            AreaMode::Polyline { thickness } => DrawingArea::Polyline(Polyline::new(thickness)),
        }
    }

    /// Check the area is complete enough to rasterize
    pub fn validate(&self) -> Result<(), GeometryError> {
        match self {
            DrawingArea::Polygon(polygon) => polygon.validate(),
            DrawingArea::Polyline(polyline) => polyline.validate(),
        }
    }

    /// Number of user-placed points
    pub fn point_count(&self) -> usize {
        match self {
            DrawingArea::Polygon(polygon) => polygon.vertices().len(),
            DrawingArea::Polyline(polyline) => polyline.points().len(),
        }
    }

    /// Mean of the user-placed points
    pub fn centroid(&self) -> Vec2 {
        let points = match self {
            DrawingArea::Polygon(polygon) => polygon.vertices(),
            DrawingArea::Polyline(polyline) => polyline.points(),
        };
        if points.is_empty() {
            return Vec2::ZERO;
        }
        points.iter().copied().sum::<Vec2>() / points.len() as f32
    }

    /// Characteristic radius used by tapered cross-sections: the farthest
    /// vertex from the centroid for polygons, half the thickness for
    /// polylines.
    pub fn half_extent(&self) -> f32 {
        match self {
            DrawingArea::Polygon(polygon) => {
                let centroid = self.centroid();
                polygon
                    .vertices()
                    .iter()
                    .map(|v| v.distance(centroid))
                    .fold(0.0, f32::max)
            }
            DrawingArea::Polyline(polyline) => polyline.thickness() * 0.5,
        }
    }

    /// Axis-aligned (min, max) bounds of everything the area can sample
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        match self {
            DrawingArea::Polygon(polygon) => point_bounds(polygon.vertices()),
            DrawingArea::Polyline(polyline) => {
                let pad = Vec2::splat(polyline.thickness() * 0.5);
                point_bounds(polyline.points()).map(|(min, max)| (min - pad, max + pad))
            }
        }
    }

    /// Width and depth of the bounds
    pub fn extent(&self) -> Vec2 {
        self.bounds().map(|(min, max)| max - min).unwrap_or(Vec2::ZERO)
    }

    /// Lazily rasterize the area at `step` spacing
    pub fn sampled_points(&self, step: f32) -> Result<Box<dyn Iterator<Item = Vec2> + '_>, GeometryError> {
        if !(step > 0.0) {
            return Err(GeometryError::InvalidStep(step));
        }
        Ok(match self {
            DrawingArea::Polygon(polygon) => Box::new(polygon.sampled_points(step)),
            DrawingArea::Polyline(polyline) => Box::new(polyline.sampled_points(step)),
        })
    }
}

fn point_bounds(points: &[Vec2]) -> Option<(Vec2, Vec2)> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f32) -> DrawingArea {
        let mut polygon = Polygon::new();
        for v in [
            Vec2::new(0.0, 0.0),
            Vec2::new(size, 0.0),
            Vec2::new(size, size),
            Vec2::new(0.0, size),
        ] {
            polygon.add_vertex(v).unwrap();
        }
        polygon.close().unwrap();
        DrawingArea::Polygon(polygon)
    }

    #[test]
    fn test_square_sampling_is_half_open() {
        let area = square(10.0);
        let points: Vec<Vec2> = area.sampled_points(1.0).unwrap().collect();
        // Even-odd keeps the left/bottom edges and drops the right/top ones
        assert_eq!(points.len(), 100);
        assert!(points.contains(&Vec2::new(0.0, 0.0)));
        assert!(points.contains(&Vec2::new(9.0, 9.0)));
        assert!(!points.contains(&Vec2::new(10.0, 5.0)));
    }

    #[test]
    fn test_centroid_and_half_extent() {
        let area = square(10.0);
        assert_eq!(area.centroid(), Vec2::new(5.0, 5.0));
        assert!((area.half_extent() - 50f32.sqrt()).abs() < 1e-5);

        let mut line = Polyline::new(4.0);
        line.add_point(Vec2::ZERO);
        line.add_point(Vec2::new(10.0, 0.0));
        let area = DrawingArea::Polyline(line);
        assert_eq!(area.half_extent(), 2.0);
        assert_eq!(area.centroid(), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_bounds_include_thickness() {
        let mut line = Polyline::new(2.0);
        line.add_point(Vec2::ZERO);
        line.add_point(Vec2::new(10.0, 0.0));
        let area = DrawingArea::Polyline(line);
        let (min, max) = area.bounds().unwrap();
        assert_eq!(min, Vec2::new(-1.0, -1.0));
        assert_eq!(max, Vec2::new(11.0, 1.0));
        assert_eq!(area.extent(), Vec2::new(12.0, 2.0));
    }

    #[test]
    fn test_invalid_step() {
        let area = square(4.0);
        assert!(matches!(area.sampled_points(0.0), Err(GeometryError::InvalidStep(_))));
    }

    #[test]
    fn test_empty_area_from_mode() {
        let area = DrawingArea::empty(AreaMode::Polyline { thickness: 3.0 });
        assert_eq!(area.point_count(), 0);
        assert!(area.bounds().is_none());
        assert_eq!(
            area.validate(),
            Err(GeometryError::TooFewPoints {
                required: 2,
                actual: 0
            })
        );
    }
}
