//! Events delivered to collaborators registered on the operation log.

use crate::types::{ModificationEvent, VolumeSummary};

/// Which way a history step moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryStep {
    Undo,
    Redo,
}

/// Engine events for renderers, scorers and sync layers.
///
/// Listeners receive cloned events in emission order, on the thread that
/// mutated the terrain.
#[derive(Debug, Clone, PartialEq)]
pub enum TerrainEvent {
    /// A brush application was committed; rebroadcast to other participants.
    Modified(ModificationEvent),
    /// A precision operation was applied and logged.
    OperationExecuted {
        operation_id: u64,
        volume: VolumeSummary,
    },
    /// A precision operation was rejected before touching the grid.
    OperationRejected { reason: String },
    /// Undo or redo restored a snapshot.
    HistoryRestored {
        step: HistoryStep,
        volume: VolumeSummary,
    },
    /// The current surface became the new baseline.
    BaselineCommitted,
    /// The surface was reset to the baseline.
    BaselineRestored,
}
