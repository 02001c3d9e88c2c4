use super::FieldConfigStore;
use crate::cache::lock;
use crate::runtime::{EditorPaneData, SelectionSyncController, SyncContext, SyncEvent};
use pivotsync_types::{DragField, TableView};
use std::sync::{Arc, Mutex, Weak};

/// Callback a drag host invokes when a field is dragged out of the editor.
pub type DragOutCallback = Box<dyn Fn(DragField) + Send + Sync>;

/// Drag-and-drop surface of the host shell.
pub trait DragHost: Send + Sync {
    fn register_drag_out(&self, callback: DragOutCallback);
}

#[derive(Debug, Default)]
struct FlushState {
    scheduled: bool,
    generation: u64,
}

struct SessionInner {
    ctx: SyncContext,
    controller: SelectionSyncController,
    store: Mutex<FieldConfigStore>,
    flush: Mutex<FlushState>,
}

/// Non-owning handle to an [`EditorSession`], for host callbacks.
#[derive(Clone)]
pub struct WeakEditorSession {
    inner: Weak<SessionInner>,
}

impl WeakEditorSession {
    pub fn upgrade(&self) -> Option<EditorSession> {
        self.inner.upgrade().map(|inner| EditorSession { inner })
    }
}

/// Owns the [`FieldConfigStore`] of the editor pane and writes its changes
/// to the backend.
///
/// Edits made in the same scheduler turn are written once. A response is
/// applied only if no newer update was issued after it.
#[derive(Clone)]
pub struct EditorSession {
    inner: Arc<SessionInner>,
}

impl EditorSession {
    pub fn new(ctx: SyncContext, controller: SelectionSyncController) -> Self {
        let store = FieldConfigStore::new(ctx.kind(), ctx.config.editor.clone());
        Self {
            inner: Arc::new(SessionInner {
                ctx,
                controller,
                store: Mutex::new(store),
                flush: Mutex::new(FlushState::default()),
            }),
        }
    }

    /// Populate the store from pane data. Never schedules a write.
    pub fn load(&self, data: &EditorPaneData) {
        lock(&self.inner.store).load_zones(
            data.table_id,
            data.source_fields.clone(),
            data.zones.clone(),
            data.layout.clone(),
        );
    }

    /// Read the store.
    pub fn read<R>(&self, f: impl FnOnce(&FieldConfigStore) -> R) -> R {
        f(&lock(&self.inner.store))
    }

    /// Mutate the store; a write is scheduled when the mutation changed
    /// anything.
    ///
    /// Must be called from within a tokio runtime.
    pub fn edit<R>(&self, f: impl FnOnce(&mut FieldConfigStore) -> R) -> R {
        let (result, pending) = {
            let mut store = lock(&self.inner.store);
            let result = f(&mut store);
            (result, store.has_pending_update())
        };
        if pending {
            self.schedule_flush();
        }
        result
    }

    fn schedule_flush(&self) {
        {
            let mut flush = lock(&self.inner.flush);
            if flush.scheduled {
                return;
            }
            flush.scheduled = true;
        }
        let session = self.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            session.flush().await;
        });
    }

    /// Write the pending batch, if any, and return the view it produced.
    ///
    /// `None` when nothing was pending, the write failed or a newer write
    /// superseded it.
    pub async fn flush(&self) -> Option<TableView> {
        let inner = &self.inner;
        let kind = inner.ctx.kind();

        lock(&inner.flush).scheduled = false;
        let (request, source_fields, config) = {
            let mut store = lock(&inner.store);
            let request = store.take_pending_request()?;
            let config = store.zones().to_config(store.layout());
            (request, store.source_fields().to_vec(), config)
        };
        let generation = {
            let mut flush = lock(&inner.flush);
            flush.generation += 1;
            flush.generation
        };
        let table_id = request.table_id;

        log::debug!("writing {} fields of table {} (generation {})", kind, table_id, generation);
        let view = match inner.ctx.api.update_fields(&request).await {
            Ok(view) => view,
            Err(err) => {
                log::warn!("{} field update of table {} failed: {}", kind, table_id, err);
                inner.ctx.events.publish(SyncEvent::UpdateFailed {
                    kind,
                    table_id,
                    reason: err.to_string(),
                });
                return None;
            }
        };

        let latest = lock(&inner.flush).generation;
        if latest != generation {
            log::warn!(
                "discarding {} update response of table {} from generation {}",
                kind,
                table_id,
                generation
            );
            inner.ctx.events.publish(SyncEvent::StaleResultDiscarded {
                kind,
                table_id: Some(table_id),
                generation,
            });
            return None;
        }

        let version = view.version;
        inner.ctx.views.set(table_id, view.clone());
        inner.ctx.views.set_fields(table_id, &source_fields, config);
        // The update may have grown or shrunk the table. A failed refresh
        // leaves the old list in place; the write itself still stands.
        if let Err(err) = inner.controller.refresh_regions().await {
            log::debug!("keeping stale {} regions after update: {}", kind, err);
        }
        inner.ctx.events.publish(SyncEvent::FieldsUpdated {
            kind,
            table_id,
            version,
        });
        Some(view)
    }

    pub fn downgrade(&self) -> WeakEditorSession {
        WeakEditorSession {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Route drag-outs reported by `host` to the store.
    pub fn attach_drag_host(&self, host: &dyn DragHost) {
        let session = self.downgrade();
        host.register_drag_out(Box::new(move |drag| {
            if let Some(session) = session.upgrade() {
                session.edit(|store| store.remove_dragged(&drag));
            }
        }));
    }

    /// Forget the loaded table and drop any response still on its way.
    pub fn reset(&self) {
        lock(&self.inner.store).clear();
        let mut flush = lock(&self.inner.flush);
        flush.generation += 1;
        flush.scheduled = false;
    }
}
