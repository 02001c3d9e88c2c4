use crate::domain::{AggregationType, DataFieldMode, LayoutConfig, TableId, TableKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Row, column or filter field in an update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub source_index: usize,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_items: Option<Vec<String>>,
}

/// Value (pivot) or data (tablix) field in an update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueFieldConfig {
    pub source_index: usize,
    /// Display name: `"Sum of Sales"` when aggregated, `"Sales"` in detail mode.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<DataFieldMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<AggregationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
}

/// Full replacement of a table's field configuration.
///
/// The same request shape serves both kinds; [`UpdateFieldsRequest::to_args`]
/// renders the kind-specific key names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateFieldsRequest {
    pub kind: TableKind,
    pub table_id: TableId,
    pub row_fields: Vec<FieldConfig>,
    pub column_fields: Vec<FieldConfig>,
    pub value_fields: Vec<ValueFieldConfig>,
    pub filter_fields: Vec<FieldConfig>,
    pub layout: LayoutConfig,
}

impl UpdateFieldsRequest {
    /// JSON object in the backend's naming for this request's kind.
    pub fn to_args(&self) -> Value {
        let (rows_key, cols_key, values_key) = match self.kind {
            TableKind::Pivot => ("rowFields", "columnFields", "valueFields"),
            TableKind::Tablix => ("rowGroups", "columnGroups", "dataFields"),
        };

        let mut obj = Map::new();
        obj.insert(self.kind.id_key().to_string(), json!(self.table_id));
        obj.insert(rows_key.to_string(), json!(self.row_fields));
        obj.insert(cols_key.to_string(), json!(self.column_fields));
        obj.insert(values_key.to_string(), json!(self.value_fields));
        obj.insert("filterFields".to_string(), json!(self.filter_fields));
        obj.insert("layout".to_string(), json!(self.layout));
        Value::Object(obj)
    }
}

/// Request to create a table from a source range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableRequest {
    /// Source range in A1 notation, e.g. `"A1:D100"`.
    pub source_range: String,
    /// Destination cell in A1 notation, e.g. `"F1"`.
    pub destination_cell: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_sheet: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_sheet: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_headers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Request to materialise the source rows behind an aggregated cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillThroughRequest {
    pub pivot_id: TableId,
    pub group_path: Vec<(usize, u32)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_records: Option<usize>,
}

/// Request to expand or collapse one row or column group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleGroupRequest {
    pub kind: TableKind,
    pub table_id: TableId,
    pub is_row: bool,
    /// Position of the field within the row or column zone.
    pub field_index: usize,
    /// Item label; `None` toggles every item of the field.
    pub value: Option<String>,
    /// Path of the toggled item. Pivot tables collapse per path; tablix
    /// groups collapse per field and ignore it.
    pub group_path: Vec<(usize, u32)>,
}

impl ToggleGroupRequest {
    pub fn to_args(&self) -> Value {
        let mut obj = Map::new();
        obj.insert(self.kind.id_key().to_string(), json!(self.table_id));
        obj.insert("isRow".to_string(), json!(self.is_row));
        obj.insert("fieldIndex".to_string(), json!(self.field_index));
        obj.insert("value".to_string(), json!(self.value));
        if self.kind == TableKind::Pivot && !self.group_path.is_empty() {
            obj.insert("groupPath".to_string(), json!(self.group_path));
        }
        Value::Object(obj)
    }
}
