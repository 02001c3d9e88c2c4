use crate::domain::{DataFieldMode, LayoutConfig, SourceField, TableId};
use serde::{Deserialize, Serialize};

/// Zone assignment as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneFieldInfo {
    pub source_index: usize,
    pub name: String,
    #[serde(default)]
    pub is_numeric: bool,
    /// Tablix data fields only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<DataFieldMode>,
    /// Value/data fields only, as a backend aggregation string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_items: Option<Vec<String>>,
}

/// Current field configuration of one table.
///
/// Pivot payloads use `rowFields`/`columnFields`/`valueFields`; tablix
/// payloads use `rowGroups`/`columnGroups`/`dataFields`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfiguration {
    #[serde(default, alias = "rowGroups")]
    pub row_fields: Vec<ZoneFieldInfo>,
    #[serde(default, alias = "columnGroups")]
    pub column_fields: Vec<ZoneFieldInfo>,
    #[serde(default, alias = "dataFields")]
    pub value_fields: Vec<ZoneFieldInfo>,
    #[serde(default)]
    pub filter_fields: Vec<ZoneFieldInfo>,
    #[serde(default)]
    pub layout: LayoutConfig,
}

impl FieldConfiguration {
    /// Every zone field, in filters/rows/columns/values order.
    pub fn all_fields(&self) -> impl Iterator<Item = &ZoneFieldInfo> {
        self.filter_fields
            .iter()
            .chain(self.row_fields.iter())
            .chain(self.column_fields.iter())
            .chain(self.value_fields.iter())
    }
}

/// Position of a filter dropdown cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterZone {
    pub row: u32,
    pub col: u32,
    pub field_index: usize,
    pub field_name: String,
}

/// Detail of the table under a cell (`get_pivot_at_cell` / `get_tablix_at_cell`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionInfo {
    #[serde(alias = "pivotId", alias = "tablixId")]
    pub id: TableId,
    #[serde(default)]
    pub is_empty: bool,
    #[serde(default)]
    pub source_fields: Vec<SourceField>,
    #[serde(default)]
    pub field_configuration: FieldConfiguration,
    #[serde(default)]
    pub filter_zones: Vec<FilterZone>,
}

/// Distinct values of one source field, for filter dropdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldUniqueValues {
    pub field_index: usize,
    pub field_name: String,
    pub unique_values: Vec<String>,
}

/// Result of a drill-through: a new sheet holding the detail rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillThroughResponse {
    pub sheet_name: String,
    pub sheet_index: usize,
    pub row_count: usize,
    pub col_count: usize,
}

/// Result of converting a table to the other kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    pub new_id: TableId,
    /// Detail data fields moved to rows because pivot tables cannot show
    /// them.
    #[serde(default)]
    pub migrated_detail_fields: Vec<String>,
}
