//! Append-only storage for executed operations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::executor::CutFillOperation;
use crate::history::now_ms;
use crate::types::VolumeSummary;

use super::events::TerrainEvent;

/// One executed operation, in the order it was applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub operation_id: u64,
    pub timestamp_ms: u64,
    pub operation: CutFillOperation,
    pub volume_after: VolumeSummary,
}

/// Thread-safe operation log with event listeners.
///
/// Records are never removed, undo included: the log is an audit trail of
/// what was applied, not of the current surface.
pub struct OperationLog {
    records: RwLock<Vec<OperationRecord>>,
    next_id: AtomicU64,
    #[allow(clippy::type_complexity)]
    event_listeners: RwLock<Vec<Box<dyn Fn(TerrainEvent) + Send + Sync>>>,
}

impl std::fmt::Debug for OperationLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let record_count = self.records.read().map(|r| r.len()).unwrap_or(0);
        let listener_count = self
            .event_listeners
            .read()
            .map(|l| l.len())
            .unwrap_or(0);
        f.debug_struct("OperationLog")
            .field("record_count", &record_count)
            .field("listener_count", &listener_count)
            .finish()
    }
}

impl Default for OperationLog {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            event_listeners: RwLock::new(Vec::new()),
        }
    }
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an applied operation and emit `OperationExecuted`.
    ///
    /// Returns the id assigned to the record.
    pub fn append(&self, operation: CutFillOperation, volume_after: VolumeSummary) -> u64 {
        let operation_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut records = self.records.write().expect("OperationLog lock poisoned");
            records.push(OperationRecord {
                operation_id,
                timestamp_ms: now_ms(),
                operation,
                volume_after,
            });
        }

        self.emit(TerrainEvent::OperationExecuted {
            operation_id,
            volume: volume_after,
        });
        operation_id
    }

    /// All records, oldest first
    pub fn records(&self) -> Vec<OperationRecord> {
        self.records.read().expect("OperationLog lock poisoned").clone()
    }

    pub fn get(&self, operation_id: u64) -> Option<OperationRecord> {
        let records = self.records.read().expect("OperationLog lock poisoned");
        records
            .iter()
            .find(|r| r.operation_id == operation_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("OperationLog lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize every record for audit or replay
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let records = self.records.read().expect("OperationLog lock poisoned");
        serde_json::to_string(&*records)
    }

    /// Register a listener for every [`TerrainEvent`] emitted from now on.
    ///
    /// Listeners run while the listener list is locked: registering another
    /// listener from inside a listener deadlocks.
    pub fn add_event_listener<F>(&self, listener: F)
    where
        F: Fn(TerrainEvent) + Send + Sync + 'static,
    {
        let mut listeners = self.event_listeners.write().expect("OperationLog lock poisoned");
        listeners.push(Box::new(listener));
    }

    /// Deliver an event to all listeners
    pub fn emit(&self, event: TerrainEvent) {
        let listeners = self.event_listeners.read().expect("OperationLog lock poisoned");
        for listener in listeners.iter() {
            listener(event.clone());
        }
    }
}
