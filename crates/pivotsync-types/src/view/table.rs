use super::cell::{CellType, ViewCell};
use crate::domain::TableId;
use serde::{Deserialize, Serialize};

/// Last fetched rendering of a pivot table or tablix.
///
/// Deserializes from both `PivotViewResponse` and `TablixViewResponse`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    #[serde(alias = "pivotId", alias = "tablixId")]
    pub id: TableId,
    #[serde(default)]
    pub version: u64,
    pub row_count: usize,
    pub col_count: usize,
    #[serde(default, alias = "rowGroupColCount")]
    pub row_label_col_count: usize,
    #[serde(default)]
    pub column_header_row_count: usize,
    #[serde(default)]
    pub filter_row_count: usize,
    #[serde(default)]
    pub filter_rows: Vec<FilterRow>,
    #[serde(default)]
    pub row_field_summaries: Vec<HeaderFieldSummary>,
    #[serde(default)]
    pub column_field_summaries: Vec<HeaderFieldSummary>,
    pub rows: Vec<ViewRow>,
    #[serde(default)]
    pub columns: Vec<ViewColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRow {
    pub view_row: usize,
    #[serde(default)]
    pub row_type: String,
    #[serde(default)]
    pub depth: u8,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_row: Option<u32>,
    pub cells: Vec<ViewCell>,
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewColumn {
    pub view_col: usize,
    #[serde(default)]
    pub col_type: String,
    #[serde(default)]
    pub depth: u8,
    #[serde(default)]
    pub width_hint: u16,
}

/// Filter-area row metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRow {
    pub field_index: usize,
    pub field_name: String,
    #[serde(default)]
    pub selected_values: Vec<String>,
    #[serde(default)]
    pub unique_values: Vec<String>,
    #[serde(default)]
    pub display_value: String,
    pub view_row: usize,
}

/// Row/column field summary used by header filter dropdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderFieldSummary {
    pub field_index: usize,
    pub field_name: String,
    #[serde(default)]
    pub has_active_filter: bool,
}

impl TableView {
    /// Cell at view-local coordinates; `None` outside the rendered rows or
    /// past the end of a short row.
    pub fn cell(&self, row: usize, col: usize) -> Option<&ViewCell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    /// Rows made up of header cells (column header band), in view order.
    pub fn header_rows(&self) -> impl Iterator<Item = &ViewRow> {
        self.rows.iter().filter(|row| {
            row.cells
                .iter()
                .any(|cell| cell.cell_type.is_dimension_header() || cell.cell_type == CellType::Corner)
        })
    }

    /// Name of a field from the header summaries or the filter area.
    pub fn summary_field_name(&self, field_index: usize) -> Option<&str> {
        self.row_field_summaries
            .iter()
            .chain(self.column_field_summaries.iter())
            .find(|s| s.field_index == field_index)
            .map(|s| s.field_name.as_str())
            .or_else(|| {
                self.filter_rows
                    .iter()
                    .find(|f| f.field_index == field_index)
                    .map(|f| f.field_name.as_str())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tablix_view_aliases() {
        let view: TableView = serde_json::from_str(
            r#"{
                "tablixId": 4,
                "version": 2,
                "rowCount": 1,
                "colCount": 2,
                "rowGroupColCount": 1,
                "columnHeaderRowCount": 0,
                "filterRowCount": 0,
                "filterRows": [],
                "rows": [{
                    "viewRow": 0,
                    "rowType": "detail",
                    "depth": 0,
                    "visible": true,
                    "sourceRow": 12,
                    "cells": [
                        {"cellType": "rowGroupHeader", "value": {"type": "Text", "data": "East"}, "formattedValue": "East"},
                        {"cellType": "detailData", "value": {"type": "Number", "data": 3.0}, "formattedValue": "3"}
                    ]
                }],
                "columns": []
            }"#,
        )
        .unwrap();

        assert_eq!(view.id, 4);
        assert_eq!(view.row_label_col_count, 1);
        assert_eq!(view.rows[0].source_row, Some(12));
        assert_eq!(view.cell(0, 0).unwrap().cell_type, CellType::RowHeader);
        assert_eq!(view.cell(0, 1).unwrap().cell_type, CellType::DetailData);
        assert!(view.cell(0, 2).is_none());
        assert!(view.cell(1, 0).is_none());
    }
}
