use crate::Result;
use crate::runtime::{SelectionSyncController, SyncContext};
use pivotsync_types::{
    CellRef, CellType, DrillThroughRequest, DrillThroughResponse, FieldUniqueValues, Region,
    TableId, TableView, ToggleGroupRequest, ViewCell,
};
use std::sync::Arc;

/// A grid cell mapped onto a table's view.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCell {
    pub region: Region,
    pub row: usize,
    pub col: usize,
    pub cell: ViewCell,
}

/// Classifies grid cells for context menus.
///
/// The synchronous queries read only the caches and may be stale; the
/// `async` ones fetch the region list and view first.
#[derive(Clone)]
pub struct ContextMenuResolver {
    ctx: SyncContext,
    controller: SelectionSyncController,
}

impl ContextMenuResolver {
    pub fn new(controller: SelectionSyncController) -> Self {
        Self {
            ctx: controller.context().clone(),
            controller,
        }
    }

    pub fn is_in_region(&self, cell: CellRef) -> bool {
        self.ctx.regions.find_at_cell(cell).is_some()
    }

    fn cached(&self, cell: CellRef) -> Option<(Region, Arc<TableView>, usize, usize)> {
        let region = self.ctx.regions.find_at_cell(cell)?;
        let view = self.ctx.views.get(region.id)?;
        let (row, col) = region.to_local(cell)?;
        Some((region, view, row, col))
    }

    fn cached_cell(&self, cell: CellRef) -> Option<ViewCell> {
        let (_, view, row, col) = self.cached(cell)?;
        view.cell(row, col).cloned()
    }

    /// Whether `cell` shows a row or column item label.
    pub fn is_dimension_header_cell(&self, cell: CellRef) -> bool {
        self.cached_cell(cell)
            .is_some_and(|c| c.cell_type.is_dimension_header())
    }

    /// Name of the field behind a header or filter cell.
    ///
    /// Uses the field index carried by the cell when the name is known,
    /// then the header layout, then the cell's own text.
    pub fn field_name_for_cell(&self, cell: CellRef) -> Option<String> {
        let (region, view, row, col) = self.cached(cell)?;
        let view_cell = view.cell(row, col)?;
        if !view_cell.cell_type.is_dimension_header() && !view_cell.cell_type.is_filter() {
            return None;
        }

        let field_index = view_cell
            .filter_field_index
            .or_else(|| view_cell.innermost_field());
        if let Some(index) = field_index {
            if let Some(name) = self.ctx.views.field_name(region.id, index) {
                return Some(name);
            }
            if let Some(name) = view.summary_field_name(index) {
                return Some(name.to_string());
            }
        }

        if let Some(name) = scan_header_name(&view, row, col, view_cell) {
            return Some(name);
        }

        let text = view_cell.formatted_value.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Item shown by a header cell ("East" under "Region").
    pub fn item_label_for_cell(&self, cell: CellRef) -> Option<String> {
        let view_cell = self.cached_cell(cell)?;
        if !view_cell.cell_type.is_dimension_header() {
            return None;
        }
        let text = view_cell.formatted_value.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Fetch the region list and the view of the table under `cell`, and
    /// return the view cell there.
    pub async fn fetch_cell_at(&self, cell: CellRef) -> Result<Option<ResolvedCell>> {
        let regions = self.ctx.api.regions().await?;
        self.ctx.regions.replace_all(regions);
        let Some(region) = self.ctx.regions.find_at_cell(cell) else {
            return Ok(None);
        };

        let view = self.ctx.api.view(region.id).await?;
        let resolved = region.to_local(cell).and_then(|(row, col)| {
            view.cell(row, col).cloned().map(|view_cell| ResolvedCell {
                region: region.clone(),
                row,
                col,
                cell: view_cell,
            })
        });
        self.ctx.views.set(region.id, view);
        Ok(resolved)
    }

    /// Drill through the data or total cell at `cell` into a new sheet.
    ///
    /// `Ok(None)` when the cell carries no group path to drill into.
    pub async fn drill_through_at(&self, cell: CellRef) -> Result<Option<DrillThroughResponse>> {
        let Some(resolved) = self.fetch_cell_at(cell).await? else {
            return Ok(None);
        };
        let cell_type = resolved.cell.cell_type;
        if !(cell_type.is_data() || cell_type.is_total()) || resolved.cell.group_path.is_empty() {
            log::debug!("{:?} cell at {} has nothing to drill into", cell_type, cell);
            return Ok(None);
        }

        let request = DrillThroughRequest {
            pivot_id: resolved.region.id,
            group_path: resolved.cell.group_path,
            max_records: self.ctx.config.drill_through.max_records,
        };
        let response = self.ctx.api.drill_through(&request).await?;
        log::info!(
            "drilled through table {} into '{}' ({} rows)",
            request.pivot_id,
            response.sheet_name,
            response.row_count
        );
        Ok(Some(response))
    }

    /// Expand or collapse the header group at `cell`.
    ///
    /// `Ok(None)` when the fresh cell is not an expandable row or column
    /// header. On success the new view is cached and the region list
    /// refreshed, since the table changes size.
    pub async fn toggle_group_at(&self, cell: CellRef) -> Result<Option<TableView>> {
        let Some(resolved) = self.fetch_cell_at(cell).await? else {
            return Ok(None);
        };
        let header = &resolved.cell;
        let Some(source_index) = header.innermost_field() else {
            return Ok(None);
        };
        if !header.cell_type.is_dimension_header() || !header.is_expandable {
            log::debug!("{:?} cell at {} is not an expandable group", header.cell_type, cell);
            return Ok(None);
        }

        let id = resolved.region.id;
        let is_row = header.cell_type == CellType::RowHeader;
        let field_index = self
            .zone_position(id, is_row, source_index)
            .unwrap_or(header.group_path.len() - 1);
        let label = header.formatted_value.trim();
        let request = ToggleGroupRequest {
            kind: self.ctx.kind(),
            table_id: id,
            is_row,
            field_index,
            value: (!label.is_empty()).then(|| label.to_string()),
            group_path: header.group_path.clone(),
        };

        let view = self.ctx.api.toggle_group(&request).await?;
        log::info!(
            "{} group '{}' of table {}",
            if header.is_collapsed { "expanded" } else { "collapsed" },
            label,
            id
        );
        self.ctx.views.set(id, view.clone());
        self.controller.refresh_regions().await?;
        Ok(Some(view))
    }

    /// Position of a source field in the cached row or column zone.
    fn zone_position(&self, id: TableId, is_row: bool, source_index: usize) -> Option<usize> {
        let fields = self.ctx.views.fields(id)?;
        let zone = if is_row {
            &fields.row_fields
        } else {
            &fields.column_fields
        };
        zone.iter().position(|f| f.source_index == source_index)
    }

    /// Distinct values of a source field, for a filter dropdown.
    pub async fn filter_values_for_field(
        &self,
        id: TableId,
        field_index: usize,
    ) -> Result<FieldUniqueValues> {
        self.ctx.api.field_unique_values(id, field_index).await
    }
}

/// Field label from the header layout: the positional field summary, else
/// the nearest labelled corner cell above (row labels) or to the left
/// (column labels).
fn scan_header_name(view: &TableView, row: usize, col: usize, cell: &ViewCell) -> Option<String> {
    let labelled_corner = |c: &ViewCell| {
        (c.cell_type == CellType::Corner && !c.formatted_value.trim().is_empty())
            .then(|| c.formatted_value.trim().to_string())
    };

    match cell.cell_type {
        CellType::RowHeader => view
            .row_field_summaries
            .get(col)
            .map(|s| s.field_name.clone())
            .or_else(|| {
                (0..row)
                    .rev()
                    .filter_map(|r| view.cell(r, col))
                    .find_map(labelled_corner)
            }),
        CellType::ColumnHeader => {
            let header_row = row.checked_sub(view.filter_row_count)?;
            view.column_field_summaries
                .get(header_row)
                .map(|s| s.field_name.clone())
                .or_else(|| {
                    (0..col)
                        .rev()
                        .filter_map(|c| view.cell(row, c))
                        .find_map(labelled_corner)
                })
        }
        _ => None,
    }
}
