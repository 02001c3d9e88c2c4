use super::TableOps;
use crate::Result;
use crate::backend::Invoker;
use crate::config::Config;
use crate::context_menu::ContextMenuResolver;
use crate::editor::{DragHost, EditorSession, WeakEditorSession};
use crate::runtime::{EditorPaneData, PaneHost, SelectionSyncController, SyncContext, SyncEvent};
use pivotsync_types::{Selection, TableKind};
use std::sync::{Arc, OnceLock};
use tokio::sync::broadcast;

/// Forwards to the host pane and loads the editor store with whatever the
/// pane is opened with.
struct EditorPaneBinding {
    host: Arc<dyn PaneHost>,
    editor: OnceLock<WeakEditorSession>,
}

impl PaneHost for EditorPaneBinding {
    fn open_pane(&self, pane_id: &str, data: EditorPaneData) {
        if let Some(editor) = self.editor.get().and_then(WeakEditorSession::upgrade) {
            editor.load(&data);
        }
        self.host.open_pane(pane_id, data);
    }

    fn close_pane(&self, pane_id: &str) {
        self.host.close_pane(pane_id);
    }

    fn is_manually_closed(&self, pane_id: &str) -> bool {
        self.host.is_manually_closed(pane_id)
    }

    fn active_context_keys(&self) -> Vec<String> {
        self.host.active_context_keys()
    }
}

/// One pivot or tablix extension: selection sync, field editor and
/// context-menu queries over a shared backend connection.
pub struct TableExtension {
    ctx: SyncContext,
    controller: SelectionSyncController,
    editor: EditorSession,
    menus: ContextMenuResolver,
}

impl TableExtension {
    pub fn new(
        kind: TableKind,
        invoker: Arc<dyn Invoker>,
        pane_host: Arc<dyn PaneHost>,
        config: Config,
    ) -> Self {
        let ctx = SyncContext::new(kind, invoker, config);
        let binding = Arc::new(EditorPaneBinding {
            host: pane_host,
            editor: OnceLock::new(),
        });
        let controller = SelectionSyncController::new(ctx.clone(), binding.clone());
        let editor = EditorSession::new(ctx.clone(), controller.clone());
        let _ = binding.editor.set(editor.downgrade());
        let menus = ContextMenuResolver::new(controller.clone());

        Self {
            ctx,
            controller,
            editor,
            menus,
        }
    }

    pub fn kind(&self) -> TableKind {
        self.ctx.kind()
    }

    pub fn context(&self) -> &SyncContext {
        &self.ctx
    }

    pub fn config(&self) -> &Config {
        &self.ctx.config
    }

    pub fn selection(&self) -> &SelectionSyncController {
        &self.controller
    }

    pub fn editor(&self) -> &EditorSession {
        &self.editor
    }

    pub fn menus(&self) -> &ContextMenuResolver {
        &self.menus
    }

    pub fn tables(&self) -> TableOps {
        TableOps::new(self.ctx.clone(), self.controller.clone())
    }

    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.ctx.events.subscribe()
    }

    pub fn attach_drag_host(&self, host: &dyn DragHost) {
        self.editor.attach_drag_host(host);
    }

    /// Load the region list for the active sheet.
    pub async fn activate(&self) -> Result<usize> {
        self.controller.refresh_regions().await
    }

    pub fn on_selection_changed(&self, selection: Selection) {
        let outcome = self.controller.on_selection_changed(selection);
        log::debug!("{} selection {:?}: {:?}", self.kind(), selection, outcome);
    }

    /// Drop all state; pending and in-flight work is discarded.
    pub fn unload(&self) {
        self.controller.reset();
        self.editor.reset();
        self.ctx.views.clear();
        log::info!("{} extension unloaded", self.kind());
    }
}
