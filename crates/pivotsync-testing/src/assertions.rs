//! Assertions over recorded backend calls and pane activity.
//!
//! Each returns an error describing the mismatch instead of panicking, so
//! tests can add context with `?`.

use crate::{MockInvoker, RecordingPaneHost};
use anyhow::{Context, Result};
use pivotsync_types::{TableId, TableKind};

/// Assert `command` was invoked exactly `expected` times.
pub fn assert_call_count(invoker: &MockInvoker, command: &str, expected: usize) -> Result<()> {
    let actual = invoker.call_count(command);
    if actual != expected {
        anyhow::bail!("Expected {} calls to '{}', got {}", expected, command, actual);
    }
    Ok(())
}

/// Assert the last `get_*_at_cell` call asked for `(row, col)`.
pub fn assert_last_detail_fetch(
    invoker: &MockInvoker,
    kind: TableKind,
    row: u32,
    col: u32,
) -> Result<()> {
    let command = match kind {
        TableKind::Pivot => "get_pivot_at_cell",
        TableKind::Tablix => "get_tablix_at_cell",
    };
    let args = invoker
        .calls_to(command)
        .pop()
        .with_context(|| format!("No call to '{}'", command))?;

    if args["row"] != row || args["col"] != col {
        anyhow::bail!("Expected detail fetch at ({}, {}), got {}", row, col, args);
    }
    Ok(())
}

/// Assert the editor pane of `kind` is open and last showed `table_id`.
pub fn assert_pane_shows(host: &RecordingPaneHost, kind: TableKind, table_id: TableId) -> Result<()> {
    if !host.is_open(kind.pane_id()) {
        anyhow::bail!("Expected pane '{}' to be open", kind.pane_id());
    }
    let data = host
        .last_opened()
        .context("Pane is open but was never given data")?;
    if data.table_id != table_id {
        anyhow::bail!("Expected pane to show table {}, got {}", table_id, data.table_id);
    }
    Ok(())
}
