// Field editing through the editor session: batching, stale responses and drag-out.
use pivotsync_runtime::{Command, SyncEvent};
use pivotsync_testing::assertions::assert_call_count;
use pivotsync_testing::{TestWorld, fixtures};
use pivotsync_types::{AggregationType, DataFieldMode, DragField, LayoutConfig, TableKind, Zone};
use std::time::Duration;

async fn opened(kind: TableKind) -> TestWorld {
    let mut world = TestWorld::new(kind).activated().await;
    world.select(2, 2);
    world.settle().await;
    world.invoker.clear_calls();
    world.drain_events();
    world
}

#[tokio::test(start_paused = true)]
async fn test_edits_in_one_turn_are_written_once() {
    let mut world = opened(TableKind::Pivot).await;
    let editor = world.extension.editor();

    editor.edit(|store| store.toggle_field(&fixtures::source_field(fixtures::UNITS_FIELD), true));
    editor.edit(|store| store.set_aggregation(1, AggregationType::Average));
    editor.edit(|store| {
        store.set_layout(&LayoutConfig {
            show_row_grand_totals: Some(false),
            ..Default::default()
        })
    });
    world.settle().await;

    let update = world.cmd(Command::UpdateFields);
    assert_call_count(&world.invoker, update, 1).unwrap();
    let calls = world.invoker.calls_to(update);
    let args = &calls[0]["request"];
    assert_eq!(args["pivotId"], 7);
    assert_eq!(args["valueFields"][1]["name"], "Average of Units");
    assert_eq!(args["layout"]["showRowGrandTotals"], false);

    // The write refreshes the region list.
    assert_call_count(&world.invoker, world.cmd(Command::Regions), 1).unwrap();
    assert_eq!(world.extension.context().views.get(7).unwrap().version, 1);
    assert!(world.drain_events().contains(&SyncEvent::FieldsUpdated {
        kind: TableKind::Pivot,
        table_id: 7,
        version: 1
    }));
}

#[tokio::test(start_paused = true)]
async fn test_write_stands_when_region_refresh_fails() {
    let mut world = opened(TableKind::Pivot).await;
    world
        .invoker
        .respond(
            world.cmd(Command::UpdateFields),
            fixtures::sales_view(TableKind::Pivot, 7, 3),
        )
        .fail(world.cmd(Command::Regions), "sheet is recalculating");
    let editor = world.extension.editor();

    editor.edit(|store| store.remove(Zone::Columns, 0));
    let view = editor.flush().await.unwrap();

    assert_eq!(view.version, 3);
    assert_eq!(world.extension.context().views.get(7).unwrap().version, 3);
    assert_eq!(world.extension.context().regions.len(), 1);
    assert_eq!(
        world.drain_events(),
        vec![SyncEvent::FieldsUpdated {
            kind: TableKind::Pivot,
            table_id: 7,
            version: 3
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn test_noop_edit_schedules_nothing() {
    let world = opened(TableKind::Pivot).await;
    let editor = world.extension.editor();

    let region = fixtures::source_field(fixtures::REGION_FIELD);
    let changed = editor.edit(|store| store.toggle_field(&region, true));
    assert!(!changed);
    world.settle().await;
    assert_call_count(&world.invoker, world.cmd(Command::UpdateFields), 0).unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_older_response_is_discarded() {
    let mut world = opened(TableKind::Pivot).await;
    let update = world.cmd(Command::UpdateFields);
    world
        .invoker
        .respond_once_after(
            update,
            fixtures::sales_view(TableKind::Pivot, 7, 1),
            Duration::from_millis(200),
        )
        .respond_once(update, fixtures::sales_view(TableKind::Pivot, 7, 2));
    let editor = world.extension.editor();

    editor.edit(|store| store.remove(Zone::Columns, 0));
    tokio::time::sleep(Duration::from_millis(10)).await;
    editor.edit(|store| store.toggle_field(&fixtures::source_field(fixtures::UNITS_FIELD), true));
    world.settle().await;

    assert_call_count(&world.invoker, update, 2).unwrap();
    assert_eq!(world.extension.context().views.get(7).unwrap().version, 2);

    let events = world.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        SyncEvent::StaleResultDiscarded {
            table_id: Some(7),
            generation: 1,
            ..
        }
    )));
    assert!(events.contains(&SyncEvent::FieldsUpdated {
        kind: TableKind::Pivot,
        table_id: 7,
        version: 2
    }));
}

#[tokio::test(start_paused = true)]
async fn test_failed_write_keeps_local_state() {
    let mut world = opened(TableKind::Pivot).await;
    let update = world.cmd(Command::UpdateFields);
    world.invoker.fail_once(update, "engine rejected layout");
    let editor = world.extension.editor();

    editor.edit(|store| store.remove(Zone::Rows, 0));
    world.settle().await;

    assert!(editor.read(|store| store.zone(Zone::Rows).is_empty()));
    assert!(world.extension.context().views.get(7).is_none());
    assert!(matches!(
        &world.drain_events()[..],
        [SyncEvent::UpdateFailed { table_id: 7, reason, .. }] if reason.contains("engine rejected layout")
    ));
}

#[tokio::test(start_paused = true)]
async fn test_drag_out_removes_field() {
    let world = opened(TableKind::Pivot).await;
    assert_eq!(world.drag.registered(), 1);
    let editor = world.extension.editor();

    let region = editor.read(|store| DragField::from_zone(Zone::Rows, 0, &store.zone(Zone::Rows)[0]));
    world.drag.drag_out(region.clone());
    assert!(editor.read(|store| store.zone(Zone::Rows).is_empty()));

    // Already gone: nothing to write.
    world.drag.drag_out(region);
    world.settle().await;
    assert_call_count(&world.invoker, world.cmd(Command::UpdateFields), 1).unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_tablix_detail_mode_request() {
    let world = opened(TableKind::Tablix).await;
    let editor = world.extension.editor();

    assert!(editor.edit(|store| store.set_mode(0, DataFieldMode::Detail)));
    world.settle().await;

    let update = world.cmd(Command::UpdateFields);
    let args = world.invoker.calls_to(update).remove(0);
    insta::with_settings!({ sort_maps => true }, {
        insta::assert_json_snapshot!(args, @r#"
        {
          "request": {
            "columnGroups": [
              {
                "name": "Product",
                "sourceIndex": 1
              }
            ],
            "dataFields": [
              {
                "mode": "detail",
                "name": "Sales",
                "sourceIndex": 2
              }
            ],
            "filterFields": [],
            "layout": {
              "showColumnGrandTotals": true,
              "showRowGrandTotals": true
            },
            "rowGroups": [
              {
                "name": "Region",
                "sourceIndex": 0
              }
            ],
            "tablixId": 7
          }
        }
        "#);
    });
}

#[tokio::test(start_paused = true)]
async fn test_written_fields_feed_the_field_index() {
    let world = opened(TableKind::Pivot).await;
    let editor = world.extension.editor();

    let units = fixtures::source_field(fixtures::UNITS_FIELD);
    editor.edit(|store| store.drop_field(Zone::Filters, &DragField::from_source(&units), None));
    world.settle().await;

    let views = &world.extension.context().views;
    assert_eq!(views.field_name(7, fixtures::UNITS_FIELD).as_deref(), Some("Units"));
    let fields = views.fields(7).unwrap();
    assert_eq!(fields.filter_fields[0].source_index, fixtures::UNITS_FIELD);
    assert_eq!(fields.value_fields[0].name, "Sum of Sales");
}
