//! Step-by-step workflow that assembles a [`CutFillOperation`]
//!
//! Stages advance only on explicit confirmation:
//!
//! ```text
//! Direction -> Magnitude -> AreaMode -> Drawing -> CrossSection
//!     -> [DeepestPoint] -> Preview -> (execute | cancel) -> Direction
//! ```
//!
//! `DeepestPoint` is skipped for straight walls. Nothing here mutates the
//! grid; [`OperationPlanner::preview`] only plans.

use earthworks_config::{EngineConfig, DEFAULT_CLOSE_CAPTURE_RADIUS};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::area::{AreaMode, DrawingArea, GeometryError, PolygonClick};
use crate::cross_section::{CrossSectionConfig, WallType};
use crate::executor::{CutFillOperation, ExecutionError, OperationExecutor, PlannedEdit};
use crate::grid::HeightfieldGrid;
use crate::types::Direction;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlannerError {
    #[error("Expected stage {expected:?}, planner is at {actual:?}")]
    WrongStage {
        expected: PlannerStage,
        actual: PlannerStage,
    },
    #[error("Missing selection: {0}")]
    MissingSelection(&'static str),
    #[error("Magnitude must be positive and finite, got {0}")]
    InvalidMagnitude(f32),
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),
}

/// Workflow stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlannerStage {
    #[default]
    Direction,
    Magnitude,
    AreaMode,
    Drawing,
    CrossSection,
    DeepestPoint,
    Preview,
}

impl PlannerStage {
    /// Stage that follows `self` once it is confirmed.
    ///
    /// `Preview` wraps back to `Direction`, which is where both execute and
    /// cancel leave the workflow.
    pub fn next(self, wall_type: WallType) -> PlannerStage {
        match self {
            PlannerStage::Direction => PlannerStage::Magnitude,
            PlannerStage::Magnitude => PlannerStage::AreaMode,
            PlannerStage::AreaMode => PlannerStage::Drawing,
            PlannerStage::Drawing => PlannerStage::CrossSection,
            PlannerStage::CrossSection if wall_type.needs_deepest_point() => PlannerStage::DeepestPoint,
            PlannerStage::CrossSection => PlannerStage::Preview,
            PlannerStage::DeepestPoint => PlannerStage::Preview,
            PlannerStage::Preview => PlannerStage::Direction,
        }
    }
}

/// What a terrain click did while drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Not drawing, click dropped
    Ignored,
    PointAdded,
    /// Polygon closed on its first vertex; planner moved to `CrossSection`
    AreaClosed,
}

/// Accumulates the selections of one cut/fill workflow
#[derive(Debug, Clone)]
pub struct OperationPlanner {
    stage: PlannerStage,
    direction: Option<Direction>,
    magnitude: Option<f32>,
    area: Option<DrawingArea>,
    is_drawing: bool,
    wall_type: Option<WallType>,
    deepest_point: Option<Vec2>,
    close_capture_radius: f32,
}

impl Default for OperationPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_CLOSE_CAPTURE_RADIUS)
    }
}

impl OperationPlanner {
    pub fn new(close_capture_radius: f32) -> Self {
        Self {
            stage: PlannerStage::Direction,
            direction: None,
            magnitude: None,
            area: None,
            is_drawing: false,
            wall_type: None,
            deepest_point: None,
            close_capture_radius,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.close_capture_radius)
    }

    pub fn stage(&self) -> PlannerStage {
        self.stage
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn magnitude(&self) -> Option<f32> {
        self.magnitude
    }

    pub fn area(&self) -> Option<&DrawingArea> {
        self.area.as_ref()
    }

    /// Whether terrain clicks currently append points
    pub fn is_drawing(&self) -> bool {
        self.is_drawing
    }

    pub fn wall_type(&self) -> Option<WallType> {
        self.wall_type
    }

    pub fn deepest_point(&self) -> Option<Vec2> {
        self.deepest_point
    }

    pub fn select_direction(&mut self, direction: Direction) -> Result<(), PlannerError> {
        self.expect_stage(PlannerStage::Direction)?;
        self.direction = Some(direction);
        self.advance();
        Ok(())
    }

    pub fn set_magnitude(&mut self, magnitude: f32) -> Result<(), PlannerError> {
        self.expect_stage(PlannerStage::Magnitude)?;
        if !magnitude.is_finite() || magnitude <= 0.0 {
            return Err(PlannerError::InvalidMagnitude(magnitude));
        }
        self.magnitude = Some(magnitude);
        self.advance();
        Ok(())
    }

    pub fn select_area_mode(&mut self, mode: AreaMode) -> Result<(), PlannerError> {
        self.expect_stage(PlannerStage::AreaMode)?;
        if let AreaMode::Polyline { thickness } = mode {
            if !(thickness > 0.0) {
                return Err(GeometryError::InvalidThickness(thickness).into());
            }
        }
        self.area = Some(DrawingArea::empty(mode));
        self.is_drawing = false;
        self.advance();
        Ok(())
    }

    /// Begin accepting terrain clicks
    pub fn start_drawing(&mut self) -> Result<(), PlannerError> {
        self.expect_stage(PlannerStage::Drawing)?;
        self.is_drawing = true;
        debug!("OperationPlanner: drawing started");
        Ok(())
    }

    /// Feed a terrain click at world (x, z)
    pub fn click(&mut self, point: Vec2) -> Result<ClickOutcome, PlannerError> {
        if self.stage != PlannerStage::Drawing || !self.is_drawing {
            warn!(
                "OperationPlanner: click at ({:.2}, {:.2}) ignored in {:?}",
                point.x, point.y, self.stage
            );
            return Ok(ClickOutcome::Ignored);
        }

        let outcome = match self.area.as_mut() {
            Some(DrawingArea::Polygon(polygon)) => {
                match polygon.handle_click(point, self.close_capture_radius)? {
                    PolygonClick::Appended => ClickOutcome::PointAdded,
                    PolygonClick::Closed => ClickOutcome::AreaClosed,
                }
            }
            Some(DrawingArea::Polyline(polyline)) => {
                polyline.add_point(point);
                ClickOutcome::PointAdded
            }
            None => return Err(PlannerError::MissingSelection("area mode")),
        };

        if outcome == ClickOutcome::AreaClosed {
            self.is_drawing = false;
            self.advance();
        }
        Ok(outcome)
    }

    /// Confirm the drawn area.
    ///
    /// Polylines end here. A polygon only closes by clicking near its first
    /// vertex, so an open one is `NotClosed`.
    pub fn finish_drawing(&mut self) -> Result<(), PlannerError> {
        self.expect_stage(PlannerStage::Drawing)?;
        match self.area.as_ref() {
            Some(DrawingArea::Polygon(polygon)) => {
                if !polygon.is_closed() {
                    return Err(GeometryError::NotClosed.into());
                }
            }
            Some(DrawingArea::Polyline(polyline)) => polyline.validate()?,
            None => return Err(PlannerError::MissingSelection("area mode")),
        }
        self.is_drawing = false;
        self.advance();
        Ok(())
    }

    pub fn select_wall_type(&mut self, wall_type: WallType) -> Result<(), PlannerError> {
        self.expect_stage(PlannerStage::CrossSection)?;
        self.wall_type = Some(wall_type);
        self.deepest_point = None;
        self.advance();
        Ok(())
    }

    /// Place the deepest point. Allowed again in `Preview` to move it.
    pub fn set_deepest_point(&mut self, point: Vec2) -> Result<(), PlannerError> {
        match self.stage {
            PlannerStage::DeepestPoint => {
                self.deepest_point = Some(point);
                self.advance();
            }
            PlannerStage::Preview if self.needs_deepest_point() => {
                self.deepest_point = Some(point);
                debug!("OperationPlanner: deepest point moved to ({:.2}, {:.2})", point.x, point.y);
            }
            actual => {
                return Err(PlannerError::WrongStage {
                    expected: PlannerStage::DeepestPoint,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Build the operation from the current selections
    pub fn operation(&self) -> Result<CutFillOperation, PlannerError> {
        self.expect_stage(PlannerStage::Preview)?;
        let direction = self.direction.ok_or(PlannerError::MissingSelection("direction"))?;
        let magnitude = self.magnitude.ok_or(PlannerError::MissingSelection("magnitude"))?;
        let area = self.area.clone().ok_or(PlannerError::MissingSelection("area"))?;
        let wall_type = self.wall_type.ok_or(PlannerError::MissingSelection("wall type"))?;

        let cross_section = if wall_type.needs_deepest_point() {
            let point = self
                .deepest_point
                .ok_or(PlannerError::MissingSelection("deepest point"))?;
            CrossSectionConfig::tapered(wall_type, point)
        } else {
            CrossSectionConfig::straight()
        };

        Ok(CutFillOperation::new(direction, magnitude, area, cross_section)?)
    }

    /// Planned deltas for the current selections, grid untouched
    pub fn preview(&self, grid: &HeightfieldGrid, executor: &OperationExecutor) -> Result<PlannedEdit, PlannerError> {
        let operation = self.operation()?;
        Ok(executor.plan(grid, &operation)?)
    }

    /// Confirm the preview: hand out the operation and start over
    pub fn execute(&mut self) -> Result<CutFillOperation, PlannerError> {
        let operation = self.operation()?;
        info!(
            "OperationPlanner: confirmed {:?} {:.3}",
            operation.direction(),
            operation.magnitude()
        );
        self.reset();
        Ok(operation)
    }

    /// Abandon the workflow
    pub fn cancel(&mut self) {
        info!("OperationPlanner: cancelled at {:?}", self.stage);
        self.reset();
    }

    /// Discard every selection and return to `Direction`
    pub fn reset(&mut self) {
        *self = Self::new(self.close_capture_radius);
    }

    fn needs_deepest_point(&self) -> bool {
        self.wall_type.is_some_and(WallType::needs_deepest_point)
    }

    fn expect_stage(&self, expected: PlannerStage) -> Result<(), PlannerError> {
        if self.stage != expected {
            return Err(PlannerError::WrongStage {
                expected,
                actual: self.stage,
            });
        }
        Ok(())
    }

    fn advance(&mut self) {
        let next = self.stage.next(self.wall_type.unwrap_or_default());
        debug!("OperationPlanner: {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use earthworks_config::TerrainConfig;

    fn planner_at_drawing(mode: AreaMode) -> OperationPlanner {
        let mut planner = OperationPlanner::default();
        planner.select_direction(Direction::Cut).unwrap();
        planner.set_magnitude(2.0).unwrap();
        planner.select_area_mode(mode).unwrap();
        planner
    }

    fn draw_square(planner: &mut OperationPlanner) {
        planner.start_drawing().unwrap();
        for p in [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ] {
            assert_eq!(planner.click(p).unwrap(), ClickOutcome::PointAdded);
        }
        assert_eq!(planner.click(Vec2::new(0.3, 0.2)).unwrap(), ClickOutcome::AreaClosed);
    }

    #[test]
    fn test_next_skips_deepest_point_for_straight_walls() {
        let mut stage = PlannerStage::Direction;
        let mut visited = vec![stage];
        while stage != PlannerStage::Preview {
            stage = stage.next(WallType::Straight);
            visited.push(stage);
        }
        assert!(!visited.contains(&PlannerStage::DeepestPoint));
        assert_eq!(visited.len(), 6);

        assert_eq!(PlannerStage::CrossSection.next(WallType::Curved), PlannerStage::DeepestPoint);
        assert_eq!(PlannerStage::CrossSection.next(WallType::Angled), PlannerStage::DeepestPoint);
        assert_eq!(PlannerStage::DeepestPoint.next(WallType::Angled), PlannerStage::Preview);
        assert_eq!(PlannerStage::Preview.next(WallType::Straight), PlannerStage::Direction);
    }

    #[test]
    fn test_straight_polygon_workflow() {
        let mut planner = planner_at_drawing(AreaMode::Polygon);
        assert_eq!(planner.stage(), PlannerStage::Drawing);

        // Clicks before drawing starts are dropped
        assert_eq!(planner.click(Vec2::new(3.0, 3.0)).unwrap(), ClickOutcome::Ignored);
        assert_eq!(planner.area().unwrap().point_count(), 0);

        draw_square(&mut planner);
        assert_eq!(planner.stage(), PlannerStage::CrossSection);
        assert!(!planner.is_drawing());

        planner.select_wall_type(WallType::Straight).unwrap();
        assert_eq!(planner.stage(), PlannerStage::Preview);

        let operation = planner.execute().unwrap();
        assert_eq!(operation.direction(), Direction::Cut);
        assert_eq!(operation.magnitude(), 2.0);
        assert_eq!(operation.area().point_count(), 4);
        assert_eq!(operation.cross_section().wall_type, WallType::Straight);

        assert_eq!(planner.stage(), PlannerStage::Direction);
        assert!(planner.direction().is_none());
        assert!(planner.area().is_none());
    }

    #[test]
    fn test_tapered_workflow_needs_deepest_point() {
        let mut planner = planner_at_drawing(AreaMode::Polygon);
        draw_square(&mut planner);
        planner.select_wall_type(WallType::Curved).unwrap();
        assert_eq!(planner.stage(), PlannerStage::DeepestPoint);
        assert!(matches!(planner.operation(), Err(PlannerError::WrongStage { .. })));

        planner.set_deepest_point(Vec2::new(5.0, 5.0)).unwrap();
        assert_eq!(planner.stage(), PlannerStage::Preview);

        let operation = planner.operation().unwrap();
        assert_eq!(
            *operation.cross_section(),
            CrossSectionConfig::tapered(WallType::Curved, Vec2::new(5.0, 5.0))
        );
    }

    #[test]
    fn test_preview_follows_deepest_point_without_mutation() {
        let grid = HeightfieldGrid::new(TerrainConfig::default()).unwrap();
        let executor = OperationExecutor::default();

        let mut planner = planner_at_drawing(AreaMode::Polygon);
        draw_square(&mut planner);
        planner.select_wall_type(WallType::Angled).unwrap();
        planner.set_deepest_point(Vec2::new(1.0, 1.0)).unwrap();

        let first = planner.preview(&grid, &executor).unwrap();
        planner.set_deepest_point(Vec2::new(8.0, 8.0)).unwrap();
        let second = planner.preview(&grid, &executor).unwrap();

        assert_ne!(first, second);
        assert_eq!(planner.stage(), PlannerStage::Preview);
        assert!(grid.elevations().iter().all(|&e| e == 0.0));
        assert_eq!(grid.revision(), 0);
    }

    #[test]
    fn test_straight_preview_rejects_deepest_point() {
        let mut planner = planner_at_drawing(AreaMode::Polygon);
        draw_square(&mut planner);
        planner.select_wall_type(WallType::Straight).unwrap();
        let err = planner.set_deepest_point(Vec2::ZERO).unwrap_err();
        assert_eq!(
            err,
            PlannerError::WrongStage {
                expected: PlannerStage::DeepestPoint,
                actual: PlannerStage::Preview
            }
        );
    }

    #[test]
    fn test_wrong_stage_and_invalid_magnitude() {
        let mut planner = OperationPlanner::default();
        let err = planner.set_magnitude(1.0).unwrap_err();
        assert_eq!(
            err,
            PlannerError::WrongStage {
                expected: PlannerStage::Magnitude,
                actual: PlannerStage::Direction
            }
        );

        planner.select_direction(Direction::Fill).unwrap();
        assert_eq!(planner.set_magnitude(0.0), Err(PlannerError::InvalidMagnitude(0.0)));
        assert_eq!(planner.stage(), PlannerStage::Magnitude);
        planner.set_magnitude(1.0).unwrap();
        assert_eq!(planner.stage(), PlannerStage::AreaMode);
    }

    #[test]
    fn test_polyline_workflow() {
        let mut planner = planner_at_drawing(AreaMode::Polyline { thickness: 2.0 });
        planner.start_drawing().unwrap();
        planner.click(Vec2::new(0.0, 0.0)).unwrap();

        let err = planner.finish_drawing().unwrap_err();
        assert!(matches!(
            err,
            PlannerError::Geometry(GeometryError::TooFewPoints { actual: 1, .. })
        ));
        assert_eq!(planner.stage(), PlannerStage::Drawing);

        planner.click(Vec2::new(10.0, 0.0)).unwrap();
        planner.finish_drawing().unwrap();
        assert_eq!(planner.stage(), PlannerStage::CrossSection);
    }

    #[test]
    fn test_invalid_thickness() {
        let mut planner = OperationPlanner::default();
        planner.select_direction(Direction::Cut).unwrap();
        planner.set_magnitude(1.0).unwrap();
        let err = planner
            .select_area_mode(AreaMode::Polyline { thickness: 0.0 })
            .unwrap_err();
        assert_eq!(err, PlannerError::Geometry(GeometryError::InvalidThickness(0.0)));
        assert_eq!(planner.stage(), PlannerStage::AreaMode);
    }

    #[test]
    fn test_polygon_closes_only_on_first_vertex() {
        let mut planner = planner_at_drawing(AreaMode::Polygon);
        planner.start_drawing().unwrap();
        planner.click(Vec2::new(0.0, 0.0)).unwrap();
        planner.click(Vec2::new(4.0, 0.0)).unwrap();
        planner.click(Vec2::new(4.0, 4.0)).unwrap();

        assert_eq!(
            planner.finish_drawing(),
            Err(PlannerError::Geometry(GeometryError::NotClosed))
        );
        assert_eq!(planner.stage(), PlannerStage::Drawing);
        assert!(planner.is_drawing());

        assert_eq!(planner.click(Vec2::new(0.3, 0.2)).unwrap(), ClickOutcome::AreaClosed);
        assert_eq!(planner.stage(), PlannerStage::CrossSection);
        assert!(planner.area().unwrap().validate().is_ok());
        assert!(matches!(
            planner.finish_drawing(),
            Err(PlannerError::WrongStage { expected: PlannerStage::Drawing, .. })
        ));
    }

    #[test]
    fn test_cancel_from_any_stage() {
        let mut planner = planner_at_drawing(AreaMode::Polygon);
        draw_square(&mut planner);
        planner.select_wall_type(WallType::Curved).unwrap();
        planner.cancel();

        assert_eq!(planner.stage(), PlannerStage::Direction);
        assert!(planner.magnitude().is_none());
        assert!(planner.wall_type().is_none());
        assert!(planner.deepest_point().is_none());
        assert!(!planner.is_drawing());
    }
}
