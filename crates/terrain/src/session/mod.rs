//! Terrain editing session
//!
//! Connects every engine part behind one owner:
//! - Brush input (single dabs, strokes, remote modification events)
//! - The precision operation workflow and executor
//! - Undo/redo history and cached volume accounting
//! - The operation log that collaborators listen on
//!
//! The session owns its grid exclusively and mutates it synchronously on the
//! caller's thread. Remote edits are replayed one call per event.

mod operations;
mod stroke;
mod undo;

use earthworks_config::{ConfigError, EarthworksConfig, EngineConfig};
use thiserror::Error;
use tracing::info;

use crate::brush::{BrushEngine, BrushSettings};
use crate::executor::{ExecutionError, OperationExecutor};
use crate::grid::{HeightfieldGrid, TerrainError, TileCoord};
use crate::history::HistoryStack;
use crate::log::OperationLog;
use crate::material::MaterialStratigraphy;
use crate::mesh::DisplayMesh;
use crate::planner::{OperationPlanner, PlannerError};
use crate::snapshot::SnapshotError;
use crate::types::{ModificationEvent, VolumeSummary};
use crate::volume::VolumeAccountant;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Terrain error: {0}")]
    Terrain(#[from] TerrainError),
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),
    #[error("Planner error: {0}")]
    Planner(#[from] PlannerError),
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// One user's terrain and everything that edits it
#[derive(Debug)]
pub struct TerrainSession {
    pub(crate) grid: HeightfieldGrid,
    pub(crate) brush: BrushEngine,
    pub(crate) history: HistoryStack,
    pub(crate) volume: VolumeAccountant,
    pub(crate) executor: OperationExecutor,
    pub(crate) planner: OperationPlanner,
    pub(crate) log: OperationLog,
    /// Height change per dab of the active stroke
    pub(crate) stroke_height_change: Option<f32>,
    /// Events of the active stroke, emitted when it ends
    pub(crate) stroke_events: Vec<ModificationEvent>,
}

impl TerrainSession {
    /// Create a session with a flat terrain and the default stratigraphy
    pub fn new(config: EarthworksConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let grid = HeightfieldGrid::with_layout(
            config.terrain,
            MaterialStratigraphy::default(),
            config.engine.tile_size as usize,
        )?;
        Ok(Self::with_grid(grid, &config.engine))
    }

    /// Create a session around an existing grid. Its current surface becomes
    /// the first history entry.
    pub fn with_grid(grid: HeightfieldGrid, engine: &EngineConfig) -> Self {
        let mut session = Self {
            grid,
            brush: BrushEngine::default(),
            history: HistoryStack::new(engine.history_limit),
            volume: VolumeAccountant::new(),
            executor: OperationExecutor::from_config(engine),
            planner: OperationPlanner::from_config(engine),
            log: OperationLog::new(),
            stroke_height_change: None,
            stroke_events: Vec::new(),
        };
        session.commit();
        info!(
            "TerrainSession: {}x{} samples, history limit {}",
            session.grid.rows(),
            session.grid.cols(),
            session.history.limit()
        );
        session
    }

    pub fn grid(&self) -> &HeightfieldGrid {
        &self.grid
    }

    pub fn brush_settings(&self) -> &BrushSettings {
        self.brush.settings()
    }

    pub fn set_brush_settings(&mut self, settings: BrushSettings) {
        self.brush.set_settings(settings);
    }

    pub fn executor(&self) -> &OperationExecutor {
        &self.executor
    }

    pub fn planner(&self) -> &OperationPlanner {
        &self.planner
    }

    /// Drive the operation workflow
    pub fn planner_mut(&mut self) -> &mut OperationPlanner {
        &mut self.planner
    }

    pub fn log(&self) -> &OperationLog {
        &self.log
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Cut, fill and net volume against the baseline
    pub fn volumes(&mut self) -> VolumeSummary {
        self.volume.volumes(&self.grid)
    }

    /// Take dirty tiles for re-meshing
    pub fn take_dirty_tiles(&mut self) -> Vec<TileCoord> {
        self.grid.take_dirty_tiles()
    }

    pub fn has_dirty_tiles(&self) -> bool {
        self.grid.has_dirty_tiles()
    }

    pub fn display_mesh(&self) -> DisplayMesh {
        DisplayMesh::from_source(&self.grid)
    }

    pub fn tile_mesh(&self, coord: TileCoord) -> DisplayMesh {
        DisplayMesh::from_tile(&self.grid, coord)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use glam::Vec2;

    use super::*;
    use crate::area::{AreaMode, DrawingArea, Polygon};
    use crate::cross_section::{CrossSectionConfig, WallType};
    use crate::executor::CutFillOperation;
    use crate::log::{HistoryStep, TerrainEvent};
    use crate::planner::PlannerStage;
    use crate::types::Direction;
    use crate::volume::compute_volumes;

    fn session() -> TerrainSession {
        TerrainSession::new(EarthworksConfig::default()).unwrap()
    }

    fn rect(x0: f32, z0: f32, x1: f32, z1: f32) -> DrawingArea {
        DrawingArea::Polygon(
            Polygon::from_vertices(vec![
                Vec2::new(x0, z0),
                Vec2::new(x1, z0),
                Vec2::new(x1, z1),
                Vec2::new(x0, z1),
            ])
            .unwrap(),
        )
    }

    fn operation(direction: Direction, magnitude: f32, area: DrawingArea, wall: WallType) -> CutFillOperation {
        let cross_section = if wall.needs_deepest_point() {
            CrossSectionConfig::tapered(wall, area.centroid())
        } else {
            CrossSectionConfig::straight()
        };
        CutFillOperation::new(direction, magnitude, area, cross_section).unwrap()
    }

    fn record_events(session: &TerrainSession) -> Arc<Mutex<Vec<TerrainEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        session.log().add_event_listener(move |event| {
            sink.lock().unwrap().push(event);
        });
        events
    }

    #[test]
    fn test_new_session_starts_flat() {
        let mut session = session();
        assert!(session.volumes().is_zero());
        assert_eq!(session.history().len(), 1);
        assert!(!session.can_undo());
        assert_eq!(session.grid().rows(), 101);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = EarthworksConfig::default();
        config.engine.history_limit = 0;
        assert!(matches!(TerrainSession::new(config), Err(SessionError::Config(_))));
    }

    #[test]
    fn test_reset_always_zeroes_volumes() {
        let mut session = session();
        session.apply_brush(-10.0, 4.0, 2.0).unwrap();
        session.apply_brush(12.0, -7.0, -1.5).unwrap();
        session
            .execute_operation(&operation(Direction::Cut, 3.0, rect(0.0, 0.0, 8.0, 6.0), WallType::Curved))
            .unwrap();
        session
            .execute_operation(&operation(Direction::Fill, 1.0, rect(-20.0, -20.0, -12.0, -15.0), WallType::Angled))
            .unwrap();
        assert!(!session.volumes().is_zero());

        session.reset_to_baseline();
        assert!(session.volumes().is_zero());
        assert!(session.grid().elevations().iter().all(|&e| e == 0.0));

        assert!(!session.can_undo());
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.undo().unwrap(), None);
        assert!(session.volumes().is_zero());
    }

    #[test]
    fn test_fill_and_cut_never_shrink_their_volume() {
        let mut session = session();
        let operations = [
            operation(Direction::Fill, 1.0, rect(0.0, 0.0, 10.0, 10.0), WallType::Straight),
            operation(Direction::Cut, 2.0, rect(5.0, 5.0, 15.0, 12.0), WallType::Curved),
            operation(Direction::Fill, 0.5, rect(-30.0, 0.0, -20.0, 6.0), WallType::Angled),
            operation(Direction::Cut, 4.0, rect(-5.0, -25.0, 5.0, -15.0), WallType::Straight),
        ];

        let mut previous = session.volumes();
        for op in &operations {
            let after = session.execute_operation(op).unwrap();
            match op.direction() {
                Direction::Fill => assert!(after.fill >= previous.fill),
                Direction::Cut => assert!(after.cut >= previous.cut),
            }
            previous = after;
        }
    }

    #[test]
    fn test_undo_fill_restores_exactly() {
        let mut session = session();
        session.apply_brush(3.0, 3.0, -1.0).unwrap();
        let before_elevations = session.grid().elevations().to_vec();
        let before_volumes = session.volumes();

        session
            .execute_operation(&operation(Direction::Fill, 1.0, rect(0.0, 0.0, 6.0, 6.0), WallType::Straight))
            .unwrap();
        assert_ne!(session.volumes(), before_volumes);

        let restored = session.undo().unwrap();
        assert_eq!(restored, Some(before_volumes));
        assert_eq!(session.grid().elevations(), before_elevations.as_slice());
        assert_eq!(compute_volumes(session.grid()), before_volumes);

        let redone = session.redo().unwrap().unwrap();
        assert!(redone.fill > before_volumes.fill);
    }

    #[test]
    fn test_history_bound() {
        let mut session = session();
        for i in 0..25 {
            session.apply_brush(i as f32 - 12.0, 0.0, 0.5).unwrap();
        }
        assert_eq!(session.history().len(), 20);

        let mut undone = 0;
        while session.undo().unwrap().is_some() {
            undone += 1;
        }
        assert_eq!(undone, 19);
        // Oldest retained state still has the first six dabs applied
        assert!(session.volumes().fill > 0.0);
        assert!(!session.can_undo());
    }

    #[test]
    fn test_off_terrain_dabs_keep_history() {
        let mut session = session();
        let events = record_events(&session);
        session.apply_brush(0.0, 0.0, 1.0).unwrap();
        for _ in 0..25 {
            let event = session.apply_brush(500.0, 500.0, 1.0).unwrap();
            session.apply_modification_event(&event).unwrap();
        }
        assert_eq!(session.history().len(), 2);

        let modified = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, TerrainEvent::Modified(_)))
            .count();
        assert_eq!(modified, 1);

        let restored = session.undo().unwrap().unwrap();
        assert!(restored.is_zero());
        assert_eq!(session.undo().unwrap(), None);
    }

    #[test]
    fn test_area_too_large_changes_nothing() {
        let mut session = session();
        let events = record_events(&session);
        session.apply_brush(0.0, 0.0, 1.0).unwrap();
        let before = session.volumes();
        let history = session.history().len();

        let err = session
            .execute_operation(&operation(Direction::Cut, 1.0, rect(-50.0, -50.0, 60.0, 0.0), WallType::Straight))
            .unwrap_err();

        assert!(matches!(err, SessionError::Execution(ExecutionError::AreaTooLarge { .. })));
        assert_eq!(session.volumes(), before);
        assert_eq!(compute_volumes(session.grid()), before);
        assert_eq!(session.history().len(), history);
        assert!(session.log().is_empty());
        assert!(matches!(
            events.lock().unwrap().last(),
            Some(TerrainEvent::OperationRejected { .. })
        ));
    }

    #[test]
    fn test_planned_square_cut() {
        let mut session = session();
        {
            let planner = session.planner_mut();
            planner.select_direction(Direction::Cut).unwrap();
            planner.set_magnitude(2.0).unwrap();
            planner.select_area_mode(AreaMode::Polygon).unwrap();
            planner.start_drawing().unwrap();
            for p in [
                Vec2::new(0.0, 0.0),
                Vec2::new(10.0, 0.0),
                Vec2::new(10.0, 10.0),
                Vec2::new(0.0, 10.0),
            ] {
                planner.click(p).unwrap();
            }
            planner.click(Vec2::new(0.3, 0.2)).unwrap();
            assert_eq!(planner.stage(), PlannerStage::CrossSection);
            planner.select_wall_type(WallType::Straight).unwrap();
        }

        let preview = session.preview().unwrap();
        assert_eq!(preview.deltas.len(), 100);
        assert!(session.volumes().is_zero());

        let volume = session.execute_planned().unwrap();
        assert!((volume.cut - 200.0).abs() < 1e-3);
        assert!(volume.fill.abs() < 1e-9);
        assert_eq!(session.planner().stage(), PlannerStage::Direction);
        assert_eq!(session.log().len(), 1);
        assert_eq!(session.grid().get_elevation(55, 55), Ok(-2.0));
    }

    #[test]
    fn test_execute_planned_requires_preview() {
        let mut session = session();
        let err = session.execute_planned().unwrap_err();
        assert!(matches!(err, SessionError::Planner(PlannerError::WrongStage { .. })));
    }

    #[test]
    fn test_stroke_commits_once() {
        let mut session = session();
        let events = record_events(&session);

        session.begin_stroke(0.5);
        assert!(session.is_stroking());
        assert_eq!(session.stroke_to(0.0, 0.0).unwrap(), 1);
        let dabs = session.stroke_to(6.0, 0.0).unwrap();
        assert!(dabs > 1);
        session.end_stroke();

        assert!(!session.is_stroking());
        assert_eq!(session.history().len(), 2);
        assert!(session.volumes().fill > 0.0);
        let modified = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, TerrainEvent::Modified(_)))
            .count();
        assert_eq!(modified, dabs + 1);
    }

    #[test]
    fn test_dab_during_stroke_finishes_stroke() {
        let mut session = session();
        session.begin_stroke(0.5);
        session.stroke_to(-10.0, 0.0).unwrap();
        session.stroke_to(-4.0, 0.0).unwrap();

        session.apply_brush(20.0, 20.0, 1.0).unwrap();
        assert!(!session.is_stroking());
        assert_eq!(session.history().len(), 3);

        let after = session.grid().elevations().to_vec();
        session.cancel_stroke().unwrap();
        assert_eq!(session.grid().elevations(), after.as_slice());

        // Undo removes the dab, then the whole stroke
        session.undo().unwrap();
        assert!(session.volumes().fill > 0.0);
        session.undo().unwrap();
        assert!(session.volumes().is_zero());
    }

    #[test]
    fn test_cancel_stroke_reverts() {
        let mut session = session();
        session.apply_brush(0.0, 0.0, 1.0).unwrap();
        let before = session.grid().elevations().to_vec();

        session.begin_stroke(-1.0);
        session.stroke_to(-5.0, 0.0).unwrap();
        session.stroke_to(5.0, 0.0).unwrap();
        assert_ne!(session.grid().elevations(), before.as_slice());

        session.cancel_stroke().unwrap();
        assert_eq!(session.grid().elevations(), before.as_slice());
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.stroke_to(1.0, 1.0).unwrap(), 0);
    }

    #[test]
    fn test_modification_events_replay_remotely() {
        let mut local = session();
        let mut remote = session();
        let events = record_events(&local);

        local.apply_brush(4.0, -3.0, 1.5).unwrap();
        local.apply_brush(-2.0, 8.0, -0.75).unwrap();

        let received: Vec<ModificationEvent> = events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                TerrainEvent::Modified(event) => Some(*event),
                _ => None,
            })
            .collect();
        assert_eq!(received.len(), 2);

        let remote_events = record_events(&remote);
        for event in &received {
            remote.apply_modification_event(event).unwrap();
        }
        assert_eq!(remote.grid().elevations(), local.grid().elevations());
        assert!(remote_events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_commit_baseline() {
        let mut session = session();
        let events = record_events(&session);
        session.apply_brush(0.0, 0.0, -2.0).unwrap();
        session.commit_baseline();

        assert!(session.volumes().is_zero());
        assert!(!session.can_undo());
        assert_eq!(session.grid().baseline(), session.grid().elevations());
        assert_eq!(events.lock().unwrap().last(), Some(&TerrainEvent::BaselineCommitted));
    }

    #[test]
    fn test_undo_emits_history_event() {
        let mut session = session();
        let events = record_events(&session);
        session.apply_brush(0.0, 0.0, 1.0).unwrap();
        session.undo().unwrap();
        assert_eq!(
            events.lock().unwrap().last(),
            Some(&TerrainEvent::HistoryRestored {
                step: HistoryStep::Undo,
                volume: VolumeSummary::default()
            })
        );
        assert_eq!(session.undo().unwrap(), None);
    }

    #[test]
    fn test_export_import_between_sessions() {
        let mut source = session();
        source
            .execute_operation(&operation(Direction::Cut, 1.5, rect(-5.0, -5.0, 5.0, 5.0), WallType::Angled))
            .unwrap();
        let json = source.export_json().unwrap();

        let mut target = session();
        target.import_json(&json).unwrap();
        assert_eq!(target.grid().elevations(), source.grid().elevations());
        assert_eq!(target.volumes(), source.volumes());
        assert!(!target.can_undo());
    }

    #[test]
    fn test_dirty_tiles_and_mesh() {
        let mut session = session();
        session.take_dirty_tiles();
        session.apply_brush(0.0, 0.0, 1.0).unwrap();
        assert!(session.has_dirty_tiles());

        let tiles = session.take_dirty_tiles();
        assert!(!tiles.is_empty());
        for tile in tiles {
            assert!(session.tile_mesh(tile).triangle_count() > 0);
        }
        assert_eq!(session.display_mesh().vertices.len(), 101 * 101);
    }
}
