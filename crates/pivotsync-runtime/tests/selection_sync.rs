// Selection-driven pane sync: debounce, single-flight and the pane guards.
use pivotsync_runtime::{Command, Config, SelectionOutcome, SyncEvent};
use pivotsync_testing::assertions::{assert_call_count, assert_last_detail_fetch, assert_pane_shows};
use pivotsync_testing::{TestWorld, fixtures};
use pivotsync_types::{CellRef, Region, Selection, TableKind, Zone};
use std::time::Duration;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_changes_fetches_once_for_last_cell() {
    let world = TestWorld::new(TableKind::Pivot).activated().await;
    let at_cell = world.cmd(Command::RegionAtCell);

    for (row, col) in [(0, 0), (1, 1), (2, 2), (3, 1), (5, 2)] {
        world.select(row, col);
        tokio::time::sleep(ms(10)).await;
    }
    assert_call_count(&world.invoker, at_cell, 0).unwrap();

    world.settle().await;
    assert_call_count(&world.invoker, at_cell, 1).unwrap();
    assert_last_detail_fetch(&world.invoker, TableKind::Pivot, 5, 2).unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_debounce_follows_config() {
    let mut config = Config::default();
    config.selection.debounce_ms = 200;
    let world = TestWorld::with_config(TableKind::Tablix, config).activated().await;
    let at_cell = world.cmd(Command::RegionAtCell);

    world.select(2, 2);
    tokio::time::sleep(ms(150)).await;
    assert_call_count(&world.invoker, at_cell, 0).unwrap();

    tokio::time::sleep(ms(100)).await;
    assert_call_count(&world.invoker, at_cell, 1).unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_change_during_fetch_starts_no_second_fetch() {
    let world = TestWorld::new(TableKind::Pivot).activated().await;
    let at_cell = world.cmd(Command::RegionAtCell);
    world.invoker.delay(at_cell, ms(200));
    let controller = world.extension.selection();

    world.select(2, 2);
    tokio::time::sleep(ms(60)).await;
    assert!(controller.is_check_in_progress());

    let outcome = controller.on_selection_changed(Selection::cell(3, 3));
    assert_eq!(outcome, SelectionOutcome::Busy);

    world.settle().await;
    assert!(!controller.is_check_in_progress());
    assert_call_count(&world.invoker, at_cell, 1).unwrap();
    assert_last_detail_fetch(&world.invoker, TableKind::Pivot, 2, 2).unwrap();

    world.select(3, 3);
    world.settle().await;
    assert_call_count(&world.invoker, at_cell, 2).unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_entering_region_opens_pane_and_leaving_closes_it() {
    let mut world = TestWorld::new(TableKind::Pivot).activated().await;
    world.drain_events();

    world.select(2, 2);
    world.settle().await;
    assert_pane_shows(&world.pane, TableKind::Pivot, 7).unwrap();

    let data = world.pane.last_opened().unwrap();
    assert_eq!(data.zones.rows[0].name, "Region");
    assert_eq!(data.zones.columns[0].name, "Product");
    assert_eq!(data.zones.values[0].name, "Sales");
    assert_eq!(data.zones.values[0].display_name(), "Sum of Sales");
    assert_eq!(world.extension.selection().open_table(), Some(7));
    assert_eq!(
        world.extension.context().views.field_name(7, fixtures::SALES_FIELD).as_deref(),
        Some("Sales")
    );

    world.select(10, 10);
    assert!(!world.pane.is_open(TableKind::Pivot.pane_id()));
    assert_eq!(world.extension.selection().open_table(), None);

    let events = world.drain_events();
    assert_eq!(
        events,
        vec![
            SyncEvent::PaneOpened {
                kind: TableKind::Pivot,
                table_id: 7
            },
            SyncEvent::PaneClosed {
                kind: TableKind::Pivot,
                table_id: Some(7)
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_just_created_table_keeps_pane_open() {
    let world = TestWorld::new(TableKind::Pivot).activated().await;
    let controller = world.extension.selection();

    world.select(2, 2);
    world.settle().await;
    controller.mark_just_created(7);

    let outcome = controller.on_selection_changed(Selection::cell(10, 10));
    assert_eq!(outcome, SelectionOutcome::KeptJustCreated);
    assert!(world.pane.is_open(TableKind::Pivot.pane_id()));
    assert_eq!(world.pane.close_count(), 0);

    controller.clear_just_created();
    let outcome = controller.on_selection_changed(Selection::cell(10, 10));
    assert_eq!(outcome, SelectionOutcome::PaneClosed);
    assert_eq!(world.pane.close_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_manually_closed_pane_stays_closed() {
    let world = TestWorld::new(TableKind::Tablix).activated().await;
    let controller = world.extension.selection();
    world.pane.set_manually_closed(TableKind::Tablix.pane_id(), true);

    let outcome = controller.on_selection_changed(Selection::cell(2, 2));
    assert_eq!(outcome, SelectionOutcome::ManuallyClosed(7));
    assert_eq!(controller.last_checked_cell(), Some(CellRef::new(2, 2)));

    world.settle().await;
    assert_call_count(&world.invoker, world.cmd(Command::RegionAtCell), 0).unwrap();
    assert_eq!(world.pane.open_count(), 0);

    let outcome = controller.on_selection_changed(Selection::cell(2, 2));
    assert_eq!(outcome, SelectionOutcome::Unchanged);
}

#[tokio::test(start_paused = true)]
async fn test_same_cell_is_not_refetched() {
    let world = TestWorld::new(TableKind::Pivot).activated().await;
    let controller = world.extension.selection();

    world.select(4, 1);
    world.settle().await;
    let outcome = controller.on_selection_changed(Selection::range(
        CellRef::new(0, 0),
        CellRef::new(4, 1),
    ));
    assert_eq!(outcome, SelectionOutcome::Unchanged);
    assert_call_count(&world.invoker, world.cmd(Command::RegionAtCell), 1).unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_reentering_region_after_leaving_refetches() {
    let world = TestWorld::new(TableKind::Pivot).activated().await;

    world.select(2, 2);
    world.settle().await;
    world.select(10, 10);
    world.select(2, 2);
    world.settle().await;

    assert_call_count(&world.invoker, world.cmd(Command::RegionAtCell), 2).unwrap();
    assert_pane_shows(&world.pane, TableKind::Pivot, 7).unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_failed_fetch_is_reported_and_not_retried() {
    let mut world = TestWorld::new(TableKind::Pivot).activated().await;
    let at_cell = world.cmd(Command::RegionAtCell);
    world.invoker.fail_once(at_cell, "backend unavailable");
    world.drain_events();

    world.select(2, 2);
    world.settle().await;
    assert_eq!(world.pane.open_count(), 0);
    assert!(!world.extension.selection().is_check_in_progress());

    let events = world.drain_events();
    assert!(matches!(
        &events[..],
        [SyncEvent::DetailFetchFailed { cell, reason, .. }]
            if *cell == CellRef::new(2, 2) && reason.contains("backend unavailable")
    ));
    assert_call_count(&world.invoker, at_cell, 1).unwrap();

    world.select(3, 2);
    world.settle().await;
    assert_pane_shows(&world.pane, TableKind::Pivot, 7).unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_unload_discards_in_flight_fetch() {
    let mut world = TestWorld::new(TableKind::Pivot).activated().await;
    let at_cell = world.cmd(Command::RegionAtCell);
    world.invoker.delay(at_cell, ms(200));
    world.drain_events();

    world.select(2, 2);
    tokio::time::sleep(ms(60)).await;
    world.extension.unload();
    assert!(world.extension.context().regions.is_empty());
    assert!(!world.extension.selection().is_check_in_progress());

    world.settle().await;
    assert_eq!(world.pane.open_count(), 0);
    assert!(matches!(
        &world.drain_events()[..],
        [SyncEvent::StaleResultDiscarded { table_id: Some(7), .. }]
    ));
}

#[tokio::test(start_paused = true)]
async fn test_unload_cancels_pending_debounce() {
    let world = TestWorld::new(TableKind::Pivot).activated().await;

    world.select(2, 2);
    world.extension.unload();
    world.settle().await;

    assert_call_count(&world.invoker, world.cmd(Command::RegionAtCell), 0).unwrap();
    assert_eq!(world.extension.selection().last_checked_cell(), None);
}

#[tokio::test(start_paused = true)]
async fn test_leaving_regions_while_just_created_cancels_debounce() {
    let world = TestWorld::new(TableKind::Pivot).activated().await;
    let controller = world.extension.selection();
    controller.mark_just_created(9);

    assert_eq!(
        controller.on_selection_changed(Selection::cell(2, 2)),
        SelectionOutcome::Scheduled(7)
    );
    assert_eq!(
        controller.on_selection_changed(Selection::cell(10, 10)),
        SelectionOutcome::KeptJustCreated
    );
    world.settle().await;

    assert_call_count(&world.invoker, world.cmd(Command::RegionAtCell), 0).unwrap();
    assert_eq!(world.pane.open_count(), 0);
    assert_eq!(world.pane.close_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_region_refresh_clears_just_created_once_cached() {
    let world = TestWorld::new(TableKind::Pivot).activated().await;
    let controller = world.extension.selection();
    controller.mark_just_created(9);

    controller.refresh_regions().await.unwrap();
    assert_eq!(controller.just_created(), Some(9));

    let world = world.with_regions(&[fixtures::region_7(), Region::new(9, 10, 0, 10, 2).empty()]);
    let controller = world.extension.selection();
    assert_eq!(controller.refresh_regions().await.unwrap(), 2);
    assert_eq!(controller.just_created(), None);
}

#[tokio::test(start_paused = true)]
async fn test_opened_pane_populates_editor_without_write() {
    let world = TestWorld::new(TableKind::Tablix).activated().await;

    world.select(1, 1);
    world.settle().await;

    let (table_id, rows, pending) = world.extension.editor().read(|store| {
        (
            store.table_id(),
            store.zone(Zone::Rows).len(),
            store.has_pending_update(),
        )
    });
    assert_eq!(table_id, Some(7));
    assert_eq!(rows, 1);
    assert!(!pending);
    assert_call_count(&world.invoker, world.cmd(Command::UpdateFields), 0).unwrap();
}
