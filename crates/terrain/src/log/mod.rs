//! Operation log and event hooks.
//!
//! - [`OperationLog`] - append-only record of executed [`CutFillOperation`]s
//! - [`TerrainEvent`] - what listeners are told about
//!
//! Renderers, scorers and multiplayer sync register closures with
//! [`OperationLog::add_event_listener`] instead of reaching into the engine.
//!
//! [`CutFillOperation`]: crate::executor::CutFillOperation

mod events;
mod storage;

pub use events::{HistoryStep, TerrainEvent};
pub use storage::{OperationLog, OperationRecord};

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use glam::Vec2;

    use super::*;
    use crate::area::{DrawingArea, Polygon};
    use crate::cross_section::CrossSectionConfig;
    use crate::executor::CutFillOperation;
    use crate::types::{Direction, VolumeSummary};

    fn operation() -> CutFillOperation {
        let polygon = Polygon::from_vertices(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 4.0),
        ])
        .unwrap();
        CutFillOperation::new(
            Direction::Fill,
            1.0,
            DrawingArea::Polygon(polygon),
            CrossSectionConfig::straight(),
        )
        .unwrap()
    }

    #[test]
    fn test_append_assigns_increasing_ids() {
        let log = OperationLog::new();
        assert!(log.is_empty());

        let first = log.append(operation(), VolumeSummary::new(0.0, 6.0));
        let second = log.append(operation(), VolumeSummary::new(0.0, 12.0));
        assert!(second > first);
        assert_eq!(log.len(), 2);

        let record = log.get(second).unwrap();
        assert_eq!(record.volume_after.fill, 12.0);
        assert!(log.get(999).is_none());
        assert_eq!(log.records()[0].operation_id, first);
    }

    #[test]
    fn test_event_listener() {
        let log = OperationLog::new();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let count_clone = Arc::clone(&count);
        log.add_event_listener(move |_event| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        let seen_clone = Arc::clone(&seen);
        log.add_event_listener(move |event| {
            seen_clone.lock().unwrap().push(event);
        });

        let id = log.append(operation(), VolumeSummary::new(0.0, 6.0));
        log.emit(TerrainEvent::BaselineCommitted);

        assert_eq!(count.load(Ordering::SeqCst), 2);
        let seen = seen.lock().unwrap();
        assert_eq!(
            seen[0],
            TerrainEvent::OperationExecuted {
                operation_id: id,
                volume: VolumeSummary::new(0.0, 6.0)
            }
        );
        assert_eq!(seen[1], TerrainEvent::BaselineCommitted);
    }

    #[test]
    fn test_late_listener_sees_later_events_only() {
        let log = OperationLog::new();
        log.emit(TerrainEvent::BaselineRestored);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        log.add_event_listener(move |event| {
            seen_clone.lock().unwrap().push(event);
        });
        log.emit(TerrainEvent::BaselineCommitted);

        assert_eq!(*seen.lock().unwrap(), vec![TerrainEvent::BaselineCommitted]);
    }

    #[test]
    fn test_to_json_round_trip() {
        let log = OperationLog::new();
        log.append(operation(), VolumeSummary::new(0.0, 6.0));
        let json = log.to_json().unwrap();
        let records: Vec<OperationRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(records, log.records());
    }
}
