//! History commits, undo and redo

use tracing::{debug, info};

use crate::history::TerrainSnapshot;
use crate::log::{HistoryStep, TerrainEvent};
use crate::types::VolumeSummary;

use super::{SessionError, TerrainSession};

impl TerrainSession {
    /// Snapshot the current surface as a new history entry
    pub(crate) fn commit(&mut self) {
        let volume = self.volume.volumes(&self.grid);
        self.history
            .push(TerrainSnapshot::new(self.grid.elevations().to_vec(), volume));
        debug!(
            "commit: history {}/{}, cut={:.3}, fill={:.3}",
            self.history.len(),
            self.history.limit(),
            volume.cut,
            volume.fill
        );
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Step back one committed change.
    ///
    /// Returns the restored volumes, or `None` when nothing is left to undo.
    /// An unfinished stroke is cancelled first.
    pub fn undo(&mut self) -> Result<Option<VolumeSummary>, SessionError> {
        self.cancel_stroke()?;
        let Some(snapshot) = self.history.undo() else {
            debug!("undo: no entries available");
            return Ok(None);
        };
        self.grid.restore_elevations(&snapshot.elevations)?;
        Ok(Some(self.restored(HistoryStep::Undo)))
    }

    /// Re-apply the last undone change
    pub fn redo(&mut self) -> Result<Option<VolumeSummary>, SessionError> {
        self.cancel_stroke()?;
        let Some(snapshot) = self.history.redo() else {
            debug!("redo: no entries available");
            return Ok(None);
        };
        self.grid.restore_elevations(&snapshot.elevations)?;
        Ok(Some(self.restored(HistoryStep::Redo)))
    }

    fn restored(&mut self, step: HistoryStep) -> VolumeSummary {
        let volume = self.volume.volumes(&self.grid);
        info!(
            "{:?}: {} undo / {} redo left, cut={:.3}, fill={:.3}",
            step,
            self.history.undo_count(),
            self.history.redo_count(),
            volume.cut,
            volume.fill
        );
        self.log.emit(TerrainEvent::HistoryRestored { step, volume });
        volume
    }
}
