mod context;
mod events;
mod pane;
mod selection;

pub use context::SyncContext;
pub use events::{DEFAULT_EVENT_CAPACITY, EventBus, SyncEvent};
pub use pane::{EditorPaneData, PaneHost};
pub use selection::{SelectionOutcome, SelectionSyncController};
