//! TestWorld pattern for declarative integration test setup.
//!
//! Builds a [`TableExtension`] over a [`MockInvoker`] scripted with the
//! reference sales table, a [`RecordingPaneHost`] and a
//! [`RecordingDragHost`].

use crate::fixtures;
use crate::{MockInvoker, RecordingDragHost, RecordingPaneHost};
use pivotsync_runtime::{Command, Config, SyncEvent, TableExtension};
use pivotsync_types::{Region, Selection, TableKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Declarative test environment.
///
/// # Example
/// ```no_run
/// use pivotsync_testing::TestWorld;
/// use pivotsync_types::TableKind;
///
/// # async fn demo() {
/// let world = TestWorld::new(TableKind::Pivot).activated().await;
/// world.select(2, 2);
/// world.settle().await;
/// assert_eq!(world.pane.open_count(), 1);
/// # }
/// ```
pub struct TestWorld {
    pub kind: TableKind,
    pub invoker: Arc<MockInvoker>,
    pub pane: Arc<RecordingPaneHost>,
    pub drag: Arc<RecordingDragHost>,
    pub extension: TableExtension,
    events: broadcast::Receiver<SyncEvent>,
}

impl TestWorld {
    /// Region 7 on the sheet, every command answered with the reference
    /// table.
    pub fn new(kind: TableKind) -> Self {
        Self::with_config(kind, Config::default())
    }

    pub fn with_config(kind: TableKind, config: Config) -> Self {
        let invoker = Arc::new(MockInvoker::new());
        let view = fixtures::sales_view(kind, 7, 1);
        invoker
            .respond(
                Self::command(kind, Command::Regions),
                fixtures::regions_json(kind, &[fixtures::region_7()]),
            )
            .respond(
                Self::command(kind, Command::RegionAtCell),
                fixtures::region_info(kind, 7),
            )
            .respond(Self::command(kind, Command::View), view.clone())
            .respond(Self::command(kind, Command::UpdateFields), view.clone())
            .respond(Self::command(kind, Command::RefreshCache), view);

        let pane = Arc::new(RecordingPaneHost::new());
        let drag = Arc::new(RecordingDragHost::new());
        let extension = TableExtension::new(kind, invoker.clone(), pane.clone(), config);
        extension.attach_drag_host(drag.as_ref());
        let events = extension.events();

        Self {
            kind,
            invoker,
            pane,
            drag,
            extension,
            events,
        }
    }

    /// Backend command name of `command` for `kind`.
    pub fn command(kind: TableKind, command: Command) -> &'static str {
        command
            .name(kind)
            .unwrap_or_else(|| panic!("{:?} has no {} command", command, kind))
    }

    pub fn cmd(&self, command: Command) -> &'static str {
        Self::command(self.kind, command)
    }

    /// Replace the scripted region list.
    pub fn with_regions(self, regions: &[Region]) -> Self {
        self.invoker.respond(
            self.cmd(Command::Regions),
            fixtures::regions_json(self.kind, regions),
        );
        self
    }

    /// Load the region cache, as the shell does when the extension starts.
    pub async fn activated(self) -> Self {
        self.extension
            .activate()
            .await
            .expect("Failed to load regions");
        self
    }

    pub fn select(&self, row: u32, col: u32) {
        self.extension.on_selection_changed(Selection::cell(row, col));
    }

    /// Let debounce timers and spawned tasks run. Needs paused time.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    /// Events published since the last drain.
    pub fn drain_events(&mut self) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
