use pivotsync_runtime::{DragHost, DragOutCallback, EditorPaneData, PaneHost};
use pivotsync_types::DragField;
use std::collections::BTreeSet;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct PaneLog {
    opened: Vec<(String, EditorPaneData)>,
    closed: Vec<String>,
    open: BTreeSet<String>,
    manually_closed: BTreeSet<String>,
}

/// Pane host that records every open and close.
#[derive(Debug, Default)]
pub struct RecordingPaneHost {
    log: Mutex<PaneLog>,
}

impl RecordingPaneHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the user dismissing (or restoring) `pane_id`.
    pub fn set_manually_closed(&self, pane_id: &str, closed: bool) {
        let mut log = self.log.lock().unwrap();
        if closed {
            log.open.remove(pane_id);
            log.manually_closed.insert(pane_id.to_string());
        } else {
            log.manually_closed.remove(pane_id);
        }
    }

    pub fn open_count(&self) -> usize {
        self.log.lock().unwrap().opened.len()
    }

    pub fn close_count(&self) -> usize {
        self.log.lock().unwrap().closed.len()
    }

    pub fn is_open(&self, pane_id: &str) -> bool {
        self.log.lock().unwrap().open.contains(pane_id)
    }

    pub fn last_opened(&self) -> Option<EditorPaneData> {
        self.log
            .lock()
            .unwrap()
            .opened
            .last()
            .map(|(_, data)| data.clone())
    }
}

impl PaneHost for RecordingPaneHost {
    fn open_pane(&self, pane_id: &str, data: EditorPaneData) {
        let mut log = self.log.lock().unwrap();
        log.open.insert(pane_id.to_string());
        log.opened.push((pane_id.to_string(), data));
    }

    fn close_pane(&self, pane_id: &str) {
        let mut log = self.log.lock().unwrap();
        log.open.remove(pane_id);
        log.closed.push(pane_id.to_string());
    }

    fn is_manually_closed(&self, pane_id: &str) -> bool {
        self.log.lock().unwrap().manually_closed.contains(pane_id)
    }

    fn active_context_keys(&self) -> Vec<String> {
        self.log.lock().unwrap().open.iter().cloned().collect()
    }
}

/// Drag host whose drag-outs are triggered by the test.
#[derive(Default)]
pub struct RecordingDragHost {
    callbacks: Mutex<Vec<DragOutCallback>>,
}

impl RecordingDragHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registered(&self) -> usize {
        self.callbacks.lock().unwrap().len()
    }

    /// Report `field` as dragged out of the editor to every registrant.
    pub fn drag_out(&self, field: DragField) {
        for callback in self.callbacks.lock().unwrap().iter() {
            callback(field.clone());
        }
    }
}

impl DragHost for RecordingDragHost {
    fn register_drag_out(&self, callback: DragOutCallback) {
        self.callbacks.lock().unwrap().push(callback);
    }
}
