//! Region caches, selection sync and field-configuration editing for the
//! pivot and tablix extensions of the spreadsheet shell.
//!
//! The backend is the source of truth; everything here is a cache or a
//! pending edit of its state, reached through an [`Invoker`].

pub mod backend;
pub mod cache;
pub mod client;
pub mod config;
pub mod context_menu;
pub mod editor;
pub mod error;
pub mod runtime;

pub use backend::{Command, Invoker, TableApi};
pub use cache::{RegionCache, ViewCache};
pub use client::{TableExtension, TableOps};
pub use config::{Config, DrillThroughConfig, EditorConfig, SelectionConfig};
pub use context_menu::{ContextMenuResolver, ResolvedCell};
pub use editor::{DragHost, DragOutCallback, EditorSession, FieldConfigStore, WeakEditorSession, Zones};
pub use error::{Error, Result};
pub use runtime::{
    EditorPaneData, EventBus, PaneHost, SelectionOutcome, SelectionSyncController, SyncContext,
    SyncEvent,
};

pub use pivotsync_types as types;
