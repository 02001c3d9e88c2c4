use super::{EditorPaneData, PaneHost, SyncContext, SyncEvent};
use crate::Result;
use crate::cache::lock;
use pivotsync_types::{CellRef, RegionInfo, Selection, TableId, TableKind};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// What a selection change led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Same active cell as the last check.
    Unchanged,
    /// A detail fetch is in flight.
    Busy,
    /// Outside every region while a just-created table is pending.
    KeptJustCreated,
    /// Outside every region; the editor pane was closed.
    PaneClosed,
    /// Inside a region whose pane the user closed.
    ManuallyClosed(TableId),
    /// Inside a region; a detail fetch runs after the debounce.
    Scheduled(TableId),
}

#[derive(Debug, Default)]
struct SyncState {
    last_checked: Option<CellRef>,
    in_flight: Option<u64>,
    next_ticket: u64,
    just_created: Option<TableId>,
    pending: Option<JoinHandle<()>>,
    generation: u64,
    open_table: Option<TableId>,
}

struct Inner {
    ctx: SyncContext,
    pane_host: Arc<dyn PaneHost>,
    state: Mutex<SyncState>,
}

/// Keeps the editor pane in step with the grid selection.
///
/// Selection changes are debounced and at most one region detail fetch is
/// in flight at a time. Fetch failures are logged and published, never
/// retried; the next selection change tries again.
#[derive(Clone)]
pub struct SelectionSyncController {
    inner: Arc<Inner>,
}

/// Clears the in-flight marker when the fetch that set it ends, however
/// it ends.
struct FlightGuard<'a> {
    state: &'a Mutex<SyncState>,
    ticket: u64,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        if state.in_flight == Some(self.ticket) {
            state.in_flight = None;
        }
    }
}

impl SelectionSyncController {
    pub fn new(ctx: SyncContext, pane_host: Arc<dyn PaneHost>) -> Self {
        Self {
            inner: Arc::new(Inner {
                ctx,
                pane_host,
                state: Mutex::new(SyncState::default()),
            }),
        }
    }

    pub fn kind(&self) -> TableKind {
        self.inner.ctx.kind()
    }

    pub fn context(&self) -> &SyncContext {
        &self.inner.ctx
    }

    /// Handle a selection change from the grid.
    ///
    /// Must be called from within a tokio runtime; the detail fetch runs on
    /// a spawned task.
    pub fn on_selection_changed(&self, selection: Selection) -> SelectionOutcome {
        let inner = &self.inner;
        let kind = self.kind();
        let cell = selection.active_cell();

        {
            let state = lock(&inner.state);
            if state.last_checked == Some(cell) {
                log::debug!("{} selection at {} unchanged", kind, cell);
                return SelectionOutcome::Unchanged;
            }
            if state.in_flight.is_some() {
                log::debug!("{} detail fetch in flight; ignoring {}", kind, cell);
                return SelectionOutcome::Busy;
            }
        }

        let Some(region) = inner.ctx.regions.find_at_cell(cell) else {
            let mut state = lock(&inner.state);
            if let Some(id) = state.just_created {
                if let Some(pending) = state.pending.take() {
                    pending.abort();
                }
                log::debug!("{} outside regions; keeping pane for new table {}", cell, id);
                return SelectionOutcome::KeptJustCreated;
            }
            if let Some(pending) = state.pending.take() {
                pending.abort();
            }
            // Re-entering the previous table cell must fetch again.
            state.last_checked = Some(cell);
            let open_table = state.open_table.take();
            drop(state);
            self.close_pane(open_table);
            return SelectionOutcome::PaneClosed;
        };

        if inner.pane_host.is_manually_closed(kind.pane_id()) {
            lock(&inner.state).last_checked = Some(cell);
            log::debug!("{} pane manually closed; not opening table {}", kind, region.id);
            return SelectionOutcome::ManuallyClosed(region.id);
        }

        let mut state = lock(&inner.state);
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        let task_inner = Arc::clone(inner);
        let debounce = inner.ctx.config.selection.debounce();
        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            // Past the debounce the fetch is no longer abortable; a reset
            // discards its result by generation instead.
            {
                let mut state = lock(&task_inner.state);
                let current = tokio::task::id();
                if state.pending.as_ref().is_some_and(|h| h.id() == current) {
                    state.pending = None;
                }
            }
            resolve(task_inner, cell).await;
        }));
        SelectionOutcome::Scheduled(region.id)
    }

    /// Fetch the table under `cell` now and open the editor for it,
    /// bypassing the debounce but not the single-flight guard.
    pub async fn check_cell(&self, cell: CellRef) {
        resolve(Arc::clone(&self.inner), cell).await;
    }

    /// Fetch the region list, replace the cache and announce it.
    pub async fn refresh_regions(&self) -> Result<usize> {
        let ctx = &self.inner.ctx;
        let regions = match ctx.api.regions().await {
            Ok(regions) => regions,
            Err(err) => {
                log::warn!("failed to refresh {} regions: {}", ctx.kind(), err);
                return Err(err);
            }
        };

        let created_arrived = {
            let state = lock(&self.inner.state);
            state
                .just_created
                .is_some_and(|id| regions.iter().any(|r| r.id == id))
        };
        ctx.regions.replace_all(regions);
        if created_arrived {
            lock(&self.inner.state).just_created = None;
        }

        let count = ctx.regions.len();
        log::info!("{} regions refreshed: {}", ctx.kind(), count);
        ctx.events.publish(SyncEvent::RegionsUpdated {
            kind: ctx.kind(),
            count,
        });
        Ok(count)
    }

    /// Keep the pane open while a table created by the user has not yet
    /// shown up in the region list.
    pub fn mark_just_created(&self, id: TableId) {
        lock(&self.inner.state).just_created = Some(id);
    }

    pub fn clear_just_created(&self) {
        lock(&self.inner.state).just_created = None;
    }

    pub fn just_created(&self) -> Option<TableId> {
        lock(&self.inner.state).just_created
    }

    /// Discard results of fetches issued so far and forget the last
    /// checked cell. Returns the new generation.
    pub fn invalidate(&self) -> u64 {
        let mut state = lock(&self.inner.state);
        state.generation += 1;
        state.last_checked = None;
        state.generation
    }

    /// Back to the freshly loaded state: no pending work, no guards, no
    /// cached regions.
    pub fn reset(&self) {
        let mut state = lock(&self.inner.state);
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        let generation = state.generation + 1;
        *state = SyncState {
            generation,
            next_ticket: state.next_ticket,
            ..SyncState::default()
        };
        drop(state);
        self.inner.ctx.regions.clear();
        log::debug!("{} selection sync reset", self.kind());
    }

    /// A table was just created; open its editor once the region appears.
    pub async fn table_created(&self, id: TableId) -> Result<()> {
        self.mark_just_created(id);
        self.invalidate();
        self.refresh_regions().await?;
        if let Some(region) = self.inner.ctx.regions.get(id) {
            self.check_cell(region.top_left()).await;
        }
        Ok(())
    }

    pub async fn table_deleted(&self, id: TableId) -> Result<()> {
        self.inner.ctx.views.delete(id);
        let was_open = {
            let mut state = lock(&self.inner.state);
            if state.just_created == Some(id) {
                state.just_created = None;
            }
            state.last_checked = None;
            if state.open_table == Some(id) {
                state.open_table = None;
                true
            } else {
                false
            }
        };
        if was_open {
            self.close_pane(Some(id));
        }
        self.refresh_regions().await.map(|_| ())
    }

    /// The active sheet changed: everything cached belongs to the old one.
    pub async fn sheet_changed(&self) -> Result<()> {
        let open_table = {
            let mut state = lock(&self.inner.state);
            if let Some(pending) = state.pending.take() {
                pending.abort();
            }
            state.generation += 1;
            state.last_checked = None;
            state.just_created = None;
            state.open_table.take()
        };
        self.inner.ctx.regions.clear();
        if open_table.is_some() {
            self.close_pane(open_table);
        }
        self.refresh_regions().await.map(|_| ())
    }

    fn close_pane(&self, table_id: Option<TableId>) {
        let inner = &self.inner;
        let kind = self.kind();
        let pane_id = kind.pane_id();
        let was_active = inner
            .pane_host
            .active_context_keys()
            .iter()
            .any(|key| key == pane_id);

        inner.pane_host.close_pane(pane_id);
        if was_active || table_id.is_some() {
            log::info!("closing {} editor", kind);
            inner.ctx.events.publish(SyncEvent::PaneClosed { kind, table_id });
        }
    }

    pub fn last_checked_cell(&self) -> Option<CellRef> {
        lock(&self.inner.state).last_checked
    }

    pub fn is_check_in_progress(&self) -> bool {
        lock(&self.inner.state).in_flight.is_some()
    }

    pub fn generation(&self) -> u64 {
        lock(&self.inner.state).generation
    }

    /// Table whose editor this controller last opened.
    pub fn open_table(&self) -> Option<TableId> {
        lock(&self.inner.state).open_table
    }
}

async fn resolve(inner: Arc<Inner>, cell: CellRef) {
    let kind = inner.ctx.kind();
    let (ticket, generation) = {
        let mut state = lock(&inner.state);
        if state.in_flight.is_some() {
            log::debug!("{} detail fetch already in flight; dropping {}", kind, cell);
            return;
        }
        state.next_ticket += 1;
        state.in_flight = Some(state.next_ticket);
        state.last_checked = Some(cell);
        (state.next_ticket, state.generation)
    };
    let _flight = FlightGuard {
        state: &inner.state,
        ticket,
    };

    match inner.ctx.api.region_at_cell(cell).await {
        Ok(Some(info)) => {
            let current = lock(&inner.state).generation;
            if current != generation {
                log::warn!(
                    "discarding {} detail for table {} from generation {}",
                    kind,
                    info.id,
                    generation
                );
                inner.ctx.events.publish(SyncEvent::StaleResultDiscarded {
                    kind,
                    table_id: Some(info.id),
                    generation,
                });
                return;
            }
            open_editor(&inner, info);
        }
        Ok(None) => log::debug!("no {} table at {}", kind, cell),
        Err(err) => {
            log::warn!("{} detail fetch at {} failed: {}", kind, cell, err);
            inner.ctx.events.publish(SyncEvent::DetailFetchFailed {
                kind,
                cell,
                reason: err.to_string(),
            });
        }
    }
}

fn open_editor(inner: &Inner, info: RegionInfo) {
    let kind = inner.ctx.kind();
    let table_id = info.id;
    inner.ctx.views.set_fields(
        table_id,
        &info.source_fields,
        info.field_configuration.clone(),
    );
    let data = EditorPaneData::from_region_info(kind, info, &inner.ctx.config.editor);
    lock(&inner.state).open_table = Some(table_id);

    log::info!("opening {} editor for table {}", kind, table_id);
    inner.pane_host.open_pane(kind.pane_id(), data);
    inner
        .ctx
        .events
        .publish(SyncEvent::PaneOpened { kind, table_id });
}
