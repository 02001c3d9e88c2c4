//! Backend payloads for a small sales table.
//!
//! Source columns: Region (0), Product (1), Sales (2, numeric), Units (3,
//! numeric). The reference table has Region on rows, Product on columns and
//! Sum of Sales as its value, rendered into rows 0-5, cols 0-3.

use pivotsync_types::{Region, SourceField, TableId, TableKind};
use serde_json::{Value, json};

pub const REGION_FIELD: usize = 0;
pub const PRODUCT_FIELD: usize = 1;
pub const SALES_FIELD: usize = 2;
pub const UNITS_FIELD: usize = 3;

pub fn source_fields() -> Vec<SourceField> {
    [
        (REGION_FIELD, "Region", false),
        (PRODUCT_FIELD, "Product", false),
        (SALES_FIELD, "Sales", true),
        (UNITS_FIELD, "Units", true),
    ]
    .into_iter()
    .map(|(index, name, is_numeric)| SourceField {
        index,
        name: name.to_string(),
        is_numeric,
    })
    .collect()
}

pub fn source_field(index: usize) -> SourceField {
    source_fields()
        .into_iter()
        .find(|f| f.index == index)
        .unwrap_or_else(|| panic!("no fixture source field {}", index))
}

/// Region 7: rows 0-5, cols 0-3.
pub fn region_7() -> Region {
    Region::new(7, 0, 0, 5, 3).with_name("PivotTable7")
}

pub fn regions_json(kind: TableKind, regions: &[Region]) -> Value {
    Value::Array(
        regions
            .iter()
            .map(|r| {
                let mut obj = json!({
                    "startRow": r.start_row,
                    "startCol": r.start_col,
                    "endRow": r.end_row,
                    "endCol": r.end_col,
                    "isEmpty": r.is_empty,
                });
                obj[kind.id_key()] = json!(r.id);
                if let Some(name) = &r.name {
                    obj["name"] = json!(name);
                }
                obj
            })
            .collect(),
    )
}

fn zone_keys(kind: TableKind) -> (&'static str, &'static str, &'static str) {
    match kind {
        TableKind::Pivot => ("rowFields", "columnFields", "valueFields"),
        TableKind::Tablix => ("rowGroups", "columnGroups", "dataFields"),
    }
}

/// `get_*_at_cell` reply for the reference table.
pub fn region_info(kind: TableKind, id: TableId) -> Value {
    let (rows_key, cols_key, values_key) = zone_keys(kind);
    let mut value_field = json!({
        "sourceIndex": SALES_FIELD,
        "name": "Sum of Sales",
        "isNumeric": true,
        "aggregation": "sum",
    });
    if kind == TableKind::Tablix {
        value_field["mode"] = json!("aggregated");
    }

    let mut info = json!({
        "isEmpty": false,
        "sourceFields": source_fields()
            .iter()
            .map(|f| json!({"index": f.index, "name": f.name, "isNumeric": f.is_numeric}))
            .collect::<Vec<_>>(),
        "fieldConfiguration": {
            rows_key: [{"sourceIndex": REGION_FIELD, "name": "Region", "isNumeric": false}],
            cols_key: [{"sourceIndex": PRODUCT_FIELD, "name": "Product", "isNumeric": false}],
            values_key: [value_field],
            "filterFields": [],
            "layout": {"showRowGrandTotals": true, "showColumnGrandTotals": true}
        },
        "filterZones": []
    });
    info[kind.id_key()] = json!(id);
    info
}

/// `get_*_at_cell` reply for a table with no fields configured yet.
pub fn empty_region_info(kind: TableKind, id: TableId) -> Value {
    let mut info = json!({
        "isEmpty": true,
        "sourceFields": source_fields()
            .iter()
            .map(|f| json!({"index": f.index, "name": f.name, "isNumeric": f.is_numeric}))
            .collect::<Vec<_>>(),
        "fieldConfiguration": {"filterFields": [], "layout": {}},
        "filterZones": []
    });
    info[kind.id_key()] = json!(id);
    info
}

/// Cell type name as `kind`'s backend spells it. Tablix views use their
/// own camelCase names; pivot views use the names as given.
pub fn cell_type_name(kind: TableKind, pivot_name: &str) -> &str {
    if kind == TableKind::Pivot {
        return pivot_name;
    }
    match pivot_name {
        "Corner" => "corner",
        "RowHeader" => "rowGroupHeader",
        "ColumnHeader" => "columnGroupHeader",
        "Data" => "aggregatedData",
        "DetailData" => "detailData",
        "RowSubtotal" => "rowSubtotal",
        "ColumnSubtotal" => "columnSubtotal",
        "GrandTotalRow" => "grandTotalRow",
        "GrandTotalColumn" => "grandTotalColumn",
        "GrandTotal" => "grandTotal",
        "FilterLabel" => "filterLabel",
        "FilterDropdown" => "filterDropdown",
        "Blank" => "blank",
        other => other,
    }
}

/// One view cell as the backend serializes it.
pub fn cell(cell_type: &str, text: &str, group_path: &[(usize, u32)]) -> Value {
    let value = match text.parse::<f64>() {
        Ok(n) => json!({"type": "Number", "data": n}),
        Err(_) if text.is_empty() => json!({"type": "Empty"}),
        Err(_) => json!({"type": "Text", "data": text}),
    };
    json!({
        "cellType": cell_type,
        "value": value,
        "formattedValue": text,
        "groupPath": group_path.iter().map(|(f, v)| json!([f, v])).collect::<Vec<_>>(),
    })
}

/// View reply built from rows of cells.
pub fn view_json(kind: TableKind, id: TableId, version: u64, rows: Vec<Vec<Value>>) -> Value {
    let col_count = rows.iter().map(Vec::len).max().unwrap_or(0);
    let row_type = match kind {
        TableKind::Pivot => "Data",
        TableKind::Tablix => "detail",
    };
    let mut view = json!({
        "version": version,
        "rowCount": rows.len(),
        "colCount": col_count,
        "rows": rows
            .into_iter()
            .enumerate()
            .map(|(i, cells)| json!({"viewRow": i, "rowType": row_type, "cells": cells}))
            .collect::<Vec<_>>(),
    });
    view[kind.id_key()] = json!(id);
    view
}

/// Rendered reference table.
///
/// ```text
///   Sum of Sales | Product | .      | .
///   Region       | Widget  | Gadget | Grand Total
///   East         | 10      | 5      | 15
///   West         | 7       | 3      | 10
///   North        | 1       | 2      | 3
///   Grand Total  | 18      | 10     | 28
/// ```
pub fn sales_view(kind: TableKind, id: TableId, version: u64) -> Value {
    let c = |cell_type: &str, text: &str, group_path: &[(usize, u32)]| {
        cell(cell_type_name(kind, cell_type), text, group_path)
    };
    let mut view = view_json(
        kind,
        id,
        version,
        vec![
            vec![
                c("Corner", "Sum of Sales", &[]),
                c("Corner", "Product", &[]),
                c("Blank", "", &[]),
                c("Blank", "", &[]),
            ],
            vec![
                c("Corner", "Region", &[]),
                c("ColumnHeader", "Widget", &[(PRODUCT_FIELD, 0)]),
                c("ColumnHeader", "Gadget", &[(PRODUCT_FIELD, 1)]),
                c("GrandTotalColumn", "Grand Total", &[]),
            ],
            data_row(kind, "East", 0, [10, 5, 15]),
            data_row(kind, "West", 1, [7, 3, 10]),
            data_row(kind, "North", 2, [1, 2, 3]),
            vec![
                c("GrandTotalRow", "Grand Total", &[]),
                c("GrandTotalRow", "18", &[(PRODUCT_FIELD, 0)]),
                c("GrandTotalRow", "10", &[(PRODUCT_FIELD, 1)]),
                c("GrandTotal", "28", &[]),
            ],
        ],
    );
    view["rowLabelColCount"] = json!(1);
    view["columnHeaderRowCount"] = json!(2);
    view["rowFieldSummaries"] = json!([{"fieldIndex": REGION_FIELD, "fieldName": "Region"}]);
    view["columnFieldSummaries"] = json!([{"fieldIndex": PRODUCT_FIELD, "fieldName": "Product"}]);
    view
}

fn data_row(kind: TableKind, label: &str, item: u32, values: [u32; 3]) -> Vec<Value> {
    let c = |cell_type: &str, text: &str, group_path: &[(usize, u32)]| {
        cell(cell_type_name(kind, cell_type), text, group_path)
    };
    vec![
        c("RowHeader", label, &[(REGION_FIELD, item)]),
        c(
            "Data",
            &values[0].to_string(),
            &[(REGION_FIELD, item), (PRODUCT_FIELD, 0)],
        ),
        c(
            "Data",
            &values[1].to_string(),
            &[(REGION_FIELD, item), (PRODUCT_FIELD, 1)],
        ),
        c("GrandTotalColumn", &values[2].to_string(), &[(REGION_FIELD, item)]),
    ]
}

pub fn drill_through_response(sheet_name: &str, row_count: usize) -> Value {
    json!({
        "sheetName": sheet_name,
        "sheetIndex": 3,
        "rowCount": row_count,
        "colCount": 4,
    })
}
