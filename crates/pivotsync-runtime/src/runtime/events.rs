use pivotsync_types::{CellRef, TableId, TableKind};
use tokio::sync::broadcast;

/// Notifications published by the sync layer.
///
/// Failures of backend calls end up here and in the log; nothing is
/// retried on their behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The region list of `kind` was replaced.
    RegionsUpdated { kind: TableKind, count: usize },
    PaneOpened { kind: TableKind, table_id: TableId },
    PaneClosed {
        kind: TableKind,
        table_id: Option<TableId>,
    },
    DetailFetchFailed {
        kind: TableKind,
        cell: CellRef,
        reason: String,
    },
    /// The backend accepted a field update and returned view `version`.
    FieldsUpdated {
        kind: TableKind,
        table_id: TableId,
        version: u64,
    },
    UpdateFailed {
        kind: TableKind,
        table_id: TableId,
        reason: String,
    },
    /// A response arrived after a newer request was issued and was dropped.
    StaleResultDiscarded {
        kind: TableKind,
        table_id: Option<TableId>,
        generation: u64,
    },
}

pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Broadcast bus for [`SyncEvent`]s.
///
/// Publishing never blocks; slow subscribers observe `Lagged` and skip.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SyncEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: SyncEvent) {
        // No subscribers is fine.
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::default();
        bus.publish(SyncEvent::RegionsUpdated {
            kind: TableKind::Pivot,
            count: 0,
        });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_every_subscriber_receives() {
        let bus = EventBus::new(4);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        let event = SyncEvent::PaneOpened {
            kind: TableKind::Tablix,
            table_id: 2,
        };

        bus.publish(event.clone());
        assert_eq!(a.try_recv().unwrap(), event);
        assert_eq!(b.try_recv().unwrap(), event);
    }
}
