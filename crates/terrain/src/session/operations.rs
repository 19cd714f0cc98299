//! Precision operations, baseline management and persistence

use tracing::{info, warn};

use crate::executor::{CutFillOperation, PlannedEdit};
use crate::log::TerrainEvent;
use crate::snapshot::TerrainExport;
use crate::types::VolumeSummary;

use super::{SessionError, TerrainSession};

impl TerrainSession {
    /// Apply a cut/fill operation, log it and return the new volumes.
    ///
    /// A rejected operation leaves the surface and history untouched and is
    /// reported to listeners as `OperationRejected`.
    pub fn execute_operation(&mut self, operation: &CutFillOperation) -> Result<VolumeSummary, SessionError> {
        self.end_stroke();
        match self
            .executor
            .execute(operation, &mut self.grid, &mut self.history, &mut self.volume)
        {
            Ok(volume) => {
                let id = self.log.append(operation.clone(), volume);
                info!("execute_operation: logged operation {}", id);
                Ok(volume)
            }
            Err(err) => {
                warn!("execute_operation: rejected: {}", err);
                self.log.emit(TerrainEvent::OperationRejected {
                    reason: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    /// Execute the planner's operation. The planner returns to its first
    /// stage on success and keeps its selections on failure.
    pub fn execute_planned(&mut self) -> Result<VolumeSummary, SessionError> {
        let operation = self.planner.operation()?;
        let volume = self.execute_operation(&operation)?;
        self.planner.reset();
        Ok(volume)
    }

    /// Deltas the planner's operation would write
    pub fn preview(&self) -> Result<PlannedEdit, SessionError> {
        Ok(self.planner.preview(&self.grid, &self.executor)?)
    }

    /// Make the current surface the new baseline. Volumes drop to zero and
    /// history starts over.
    pub fn commit_baseline(&mut self) {
        self.end_stroke();
        self.grid.commit_baseline();
        self.history.clear();
        self.commit();
        info!("commit_baseline: history cleared");
        self.log.emit(TerrainEvent::BaselineCommitted);
    }

    /// Put the surface back on the baseline; history starts over
    pub fn reset_to_baseline(&mut self) {
        self.end_stroke();
        self.grid.reset_to_baseline();
        self.history.clear();
        self.commit();
        info!("reset_to_baseline: history cleared");
        self.log.emit(TerrainEvent::BaselineRestored);
    }

    pub fn export(&self) -> TerrainExport {
        self.grid.export()
    }

    /// Load a saved terrain of the same layout; history starts over
    pub fn import(&mut self, export: &TerrainExport) -> Result<(), SessionError> {
        self.cancel_stroke()?;
        self.grid.import(export)?;
        self.history.clear();
        self.volume.invalidate();
        self.commit();
        Ok(())
    }

    pub fn export_json(&self) -> Result<String, SessionError> {
        Ok(self.export().to_json()?)
    }

    pub fn import_json(&mut self, json: &str) -> Result<(), SessionError> {
        let export = TerrainExport::from_json(json)?;
        self.import(&export)
    }
}
