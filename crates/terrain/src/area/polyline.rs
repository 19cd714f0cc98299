//! Centerline areas: a polyline swept with a fixed thickness

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::GeometryError;
use crate::constants::{GEOMETRY_EPSILON, MIN_POLYLINE_POINTS};

/// Ordered (x, z) centerline with a total width of `thickness`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Vec2>,
    thickness: f32,
}

impl Polyline {
    pub fn new(thickness: f32) -> Self {
        Self {
            points: Vec::new(),
            thickness,
        }
    }

    /// Build a polyline directly from points
    pub fn from_points(points: Vec<Vec2>, thickness: f32) -> Result<Self, GeometryError> {
        let polyline = Self { points, thickness };
        polyline.validate()?;
        Ok(polyline)
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    pub fn add_point(&mut self, point: Vec2) {
        self.points.push(point);
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.points.len() < MIN_POLYLINE_POINTS {
            return Err(GeometryError::TooFewPoints {
                required: MIN_POLYLINE_POINTS,
                actual: self.points.len(),
            });
        }
        if !(self.thickness > 0.0) {
            return Err(GeometryError::InvalidThickness(self.thickness));
        }
        Ok(())
    }

    /// Sample each segment along its length at `step`, and across its
    /// perpendicular within `±thickness / 2`.
    ///
    /// Segment junctions produce duplicate points; consumers resolve those
    /// per grid sample.
    pub fn sampled_points(&self, step: f32) -> impl Iterator<Item = Vec2> + '_ {
        let half = self.thickness * 0.5;
        let across_count = (self.thickness / step + GEOMETRY_EPSILON).floor() as usize;
        let across_step = if across_count > 0 {
            self.thickness / across_count as f32
        } else {
            0.0
        };

        self.points
            .windows(2)
            .filter_map(|pair| {
                let (a, b) = (pair[0], pair[1]);
                let length = a.distance(b);
                if length < GEOMETRY_EPSILON {
                    return None;
                }
                let direction = (b - a) / length;
                Some((a, direction, direction.perp(), length))
            })
            .flat_map(move |(a, direction, perpendicular, length)| {
                let along_count = (length / step - GEOMETRY_EPSILON).ceil().max(0.0) as usize;
                (0..=along_count).flat_map(move |i| {
                    let center = a + direction * (i as f32 * step).min(length);
                    (0..=across_count).map(move |k| {
                        let offset = if across_count > 0 {
                            -half + k as f32 * across_step
                        } else {
                            0.0
                        };
                        center + perpendicular * offset
                    })
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let mut line = Polyline::new(2.0);
        line.add_point(Vec2::ZERO);
        assert_eq!(
            line.validate(),
            Err(GeometryError::TooFewPoints {
                required: 2,
                actual: 1
            })
        );
        line.add_point(Vec2::X);
        assert!(line.validate().is_ok());

        let err = Polyline::from_points(vec![Vec2::ZERO, Vec2::X], 0.0).unwrap_err();
        assert_eq!(err, GeometryError::InvalidThickness(0.0));
    }

    #[test]
    fn test_straight_segment_fan() {
        let line = Polyline::from_points(vec![Vec2::ZERO, Vec2::new(4.0, 0.0)], 2.0).unwrap();
        let points: Vec<Vec2> = line.sampled_points(1.0).collect();
        // 5 stations along, 3 offsets across (-1, 0, 1)
        assert_eq!(points.len(), 15);
        assert!(points.iter().all(|p| p.y.abs() <= 1.0 + 1e-6));
        assert!(points.iter().any(|p| (p.x - 4.0).abs() < 1e-6 && (p.y - 1.0).abs() < 1e-6));
        assert!(points.iter().any(|p| p.x.abs() < 1e-6 && (p.y + 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_endpoint_reached_when_not_aligned() {
        let line = Polyline::from_points(vec![Vec2::ZERO, Vec2::new(2.5, 0.0)], 0.5).unwrap();
        let points: Vec<Vec2> = line.sampled_points(1.0).collect();
        // Thinner than the step: centerline only, stations 0, 1, 2, 2.5
        assert_eq!(points.len(), 4);
        assert!(points.iter().all(|p| p.y == 0.0));
        assert!((points[3].x - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_perpendicular_follows_segment() {
        let line = Polyline::from_points(vec![Vec2::ZERO, Vec2::new(0.0, 3.0)], 2.0).unwrap();
        let points: Vec<Vec2> = line.sampled_points(1.0).collect();
        assert!(points.iter().all(|p| p.x.abs() <= 1.0 + 1e-6));
        assert!(points.iter().any(|p| (p.x - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_degenerate_segment_skipped() {
        let line = Polyline::from_points(vec![Vec2::ONE, Vec2::ONE], 2.0).unwrap();
        assert_eq!(line.sampled_points(1.0).count(), 0);
    }
}
