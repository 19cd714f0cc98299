//! Brush strokes and remote modification replay

use glam::Vec2;
use tracing::{debug, info};

use crate::log::TerrainEvent;
use crate::types::ModificationEvent;

use super::{SessionError, TerrainSession};

impl TerrainSession {
    /// Apply one brush dab at world (x, z) and commit it.
    ///
    /// Positive `height_change` raises, negative lowers. The returned event is
    /// also delivered to listeners for rebroadcast. An unfinished stroke is
    /// ended first. A dab that touches no sample commits nothing and is not
    /// emitted.
    pub fn apply_brush(&mut self, x: f32, z: f32, height_change: f32) -> Result<ModificationEvent, SessionError> {
        self.end_stroke();
        let application = self.brush.apply(&mut self.grid, x, z, height_change)?;
        if application.samples_affected == 0 {
            debug!("apply_brush: nothing changed at ({:.2}, {:.2}), no commit", x, z);
            return Ok(application.event);
        }
        self.commit();
        self.log.emit(TerrainEvent::Modified(application.event));
        Ok(application.event)
    }

    /// Apply an edit received from another participant.
    ///
    /// Uses the local brush settings and commits like a local dab, but is not
    /// re-emitted as `Modified` so it does not echo back.
    pub fn apply_modification_event(&mut self, event: &ModificationEvent) -> Result<(), SessionError> {
        let application = self.brush.apply(&mut self.grid, event.x, event.z, event.height_delta)?;
        if application.samples_affected > 0 {
            self.commit();
        }
        debug!(
            "apply_modification_event: {:?} at ({:.2}, {:.2}) -> {} samples",
            event.tool, event.x, event.z, application.samples_affected
        );
        Ok(())
    }

    /// Begin a stroke that changes height by `height_change` per dab
    pub fn begin_stroke(&mut self, height_change: f32) {
        if self.is_stroking() {
            debug!("begin_stroke: replacing unfinished stroke");
            self.stroke_events.clear();
        }
        self.brush.begin_stroke();
        self.stroke_height_change = Some(height_change);
    }

    /// Continue the stroke to world (x, z), returning the number of dabs applied
    pub fn stroke_to(&mut self, x: f32, z: f32) -> Result<usize, SessionError> {
        let Some(height_change) = self.stroke_height_change else {
            debug!("stroke_to: no active stroke, ignoring");
            return Ok(0);
        };

        let dabs = self.brush.stroke_to(Vec2::new(x, z));
        for dab in &dabs {
            let application = self.brush.apply(&mut self.grid, dab.x, dab.y, height_change)?;
            if application.samples_affected > 0 {
                self.stroke_events.push(application.event);
            }
        }
        Ok(dabs.len())
    }

    /// Finish the stroke: one history snapshot, then its events are emitted
    pub fn end_stroke(&mut self) {
        if self.stroke_height_change.take().is_none() {
            return;
        }
        self.brush.end_stroke();

        let events = std::mem::take(&mut self.stroke_events);
        if events.is_empty() {
            debug!("end_stroke: no dabs applied");
            return;
        }
        self.commit();
        info!("end_stroke: committed {} dabs", events.len());
        for event in events {
            self.log.emit(TerrainEvent::Modified(event));
        }
    }

    /// Abort the stroke and put the surface back to the last committed state
    pub fn cancel_stroke(&mut self) -> Result<(), SessionError> {
        if self.stroke_height_change.take().is_none() {
            return Ok(());
        }
        self.brush.end_stroke();
        let dabs = std::mem::take(&mut self.stroke_events).len();

        if let Some(snapshot) = self.history.current() {
            self.grid.restore_elevations(&snapshot.elevations)?;
        }
        debug!("cancel_stroke: reverted {} dabs", dabs);
        Ok(())
    }

    pub fn is_stroking(&self) -> bool {
        self.stroke_height_change.is_some()
    }
}
