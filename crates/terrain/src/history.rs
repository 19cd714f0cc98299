//! Bounded undo/redo history of whole-grid snapshots

use earthworks_config::DEFAULT_HISTORY_LIMIT;
use tracing::debug;

use crate::types::VolumeSummary;

/// Elevation state after a committed mutation
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainSnapshot {
    pub elevations: Vec<f32>,
    pub timestamp_ms: u64,
    pub volume: VolumeSummary,
}

impl TerrainSnapshot {
    pub fn new(elevations: Vec<f32>, volume: VolumeSummary) -> Self {
        Self {
            elevations,
            timestamp_ms: now_ms(),
            volume,
        }
    }
}

/// Linear history of snapshots with a cursor on the current state.
///
/// Entries before the cursor can be undone to, entries after it redone to.
/// Pushing after an undo discards the redo branch; pushing past the limit
/// drops the oldest entry.
#[derive(Debug)]
pub struct HistoryStack {
    entries: Vec<TerrainSnapshot>,
    cursor: usize,
    limit: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl HistoryStack {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Record a new current state
    pub fn push(&mut self, snapshot: TerrainSnapshot) {
        if !self.entries.is_empty() {
            let discarded = self.entries.len() - self.cursor - 1;
            if discarded > 0 {
                debug!("HistoryStack::push: discarding {} redo entries", discarded);
            }
            self.entries.truncate(self.cursor + 1);
        }

        self.entries.push(snapshot);

        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(0..excess);
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back, returning the state to restore
    pub fn undo(&mut self) -> Option<&TerrainSnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward, returning the state to restore
    pub fn redo(&mut self) -> Option<&TerrainSnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    /// The state the grid is currently in
    pub fn current(&self) -> Option<&TerrainSnapshot> {
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of undo steps available
    pub fn undo_count(&self) -> usize {
        if self.entries.is_empty() { 0 } else { self.cursor }
    }

    /// Number of redo steps available
    pub fn redo_count(&self) -> usize {
        self.entries.len().saturating_sub(self.cursor + 1)
    }

    /// Retained snapshots, including the current one
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
