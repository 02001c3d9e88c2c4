use serde::{Deserialize, Serialize};

/// Role of a rendered cell within a table view.
///
/// Pivot views name cell types in PascalCase (`RowHeader`), tablix views in
/// camelCase with their own names (`rowGroupHeader`, `aggregatedData`).
/// Both fold into the same variants; anything unknown becomes `Blank`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    #[serde(alias = "corner")]
    Corner,
    #[serde(alias = "rowHeader", alias = "RowGroupHeader", alias = "rowGroupHeader")]
    RowHeader,
    #[serde(
        alias = "columnHeader",
        alias = "ColumnGroupHeader",
        alias = "columnGroupHeader"
    )]
    ColumnHeader,
    #[serde(alias = "data", alias = "AggregatedData", alias = "aggregatedData")]
    Data,
    #[serde(alias = "detailData")]
    DetailData,
    #[serde(alias = "rowSubtotal")]
    RowSubtotal,
    #[serde(alias = "columnSubtotal")]
    ColumnSubtotal,
    #[serde(alias = "grandTotalRow")]
    GrandTotalRow,
    #[serde(alias = "grandTotalColumn")]
    GrandTotalColumn,
    #[serde(alias = "grandTotal")]
    GrandTotal,
    #[serde(alias = "filterLabel")]
    FilterLabel,
    #[serde(alias = "filterDropdown")]
    FilterDropdown,
    #[serde(other)]
    Blank,
}

impl CellType {
    /// Row or column header: the cells that name a dimension item.
    pub fn is_dimension_header(&self) -> bool {
        matches!(self, CellType::RowHeader | CellType::ColumnHeader)
    }

    pub fn is_data(&self) -> bool {
        matches!(self, CellType::Data | CellType::DetailData)
    }

    pub fn is_total(&self) -> bool {
        matches!(
            self,
            CellType::RowSubtotal
                | CellType::ColumnSubtotal
                | CellType::GrandTotalRow
                | CellType::GrandTotalColumn
                | CellType::GrandTotal
        )
    }

    pub fn is_filter(&self) -> bool {
        matches!(self, CellType::FilterLabel | CellType::FilterDropdown)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(String),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

/// One `(field_index, value_id)` breadcrumb identifying the group a cell
/// belongs to.
pub type GroupPathEntry = (usize, u32);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCell {
    pub cell_type: CellType,
    #[serde(default)]
    pub value: CellValue,
    #[serde(default)]
    pub formatted_value: String,
    #[serde(default)]
    pub indent_level: u8,
    #[serde(default)]
    pub is_bold: bool,
    #[serde(default)]
    pub is_expandable: bool,
    #[serde(default)]
    pub is_collapsed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_field_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_path: Vec<GroupPathEntry>,
}

impl ViewCell {
    pub fn new(cell_type: CellType, formatted_value: impl Into<String>) -> Self {
        Self {
            cell_type,
            value: CellValue::Empty,
            formatted_value: formatted_value.into(),
            indent_level: 0,
            is_bold: false,
            is_expandable: false,
            is_collapsed: false,
            number_format: None,
            filter_field_index: None,
            group_path: Vec::new(),
        }
    }

    pub fn with_group_path(mut self, path: Vec<GroupPathEntry>) -> Self {
        self.group_path = path;
        self
    }

    pub fn with_value(mut self, value: CellValue) -> Self {
        self.value = value;
        self
    }

    /// Source field the innermost group of this cell belongs to.
    pub fn innermost_field(&self) -> Option<usize> {
        self.group_path.last().map(|(field, _)| *field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> CellType {
        serde_json::from_str::<CellType>(&format!("\"{}\"", s)).unwrap()
    }

    #[test]
    fn test_cell_type_aliases_and_fallback() {
        assert_eq!(parse("RowGroupHeader"), CellType::RowHeader);
        assert_eq!(parse("ColumnHeader"), CellType::ColumnHeader);
        assert_eq!(parse("AggregatedData"), CellType::Data);
        assert_eq!(parse("SomethingNew"), CellType::Blank);
    }

    #[test]
    fn test_tablix_cell_type_names() {
        let cases = [
            ("corner", CellType::Corner),
            ("rowGroupHeader", CellType::RowHeader),
            ("columnGroupHeader", CellType::ColumnHeader),
            ("aggregatedData", CellType::Data),
            ("detailData", CellType::DetailData),
            ("rowSubtotal", CellType::RowSubtotal),
            ("columnSubtotal", CellType::ColumnSubtotal),
            ("grandTotalRow", CellType::GrandTotalRow),
            ("grandTotalColumn", CellType::GrandTotalColumn),
            ("grandTotal", CellType::GrandTotal),
            ("blank", CellType::Blank),
            ("filterLabel", CellType::FilterLabel),
            ("filterDropdown", CellType::FilterDropdown),
        ];
        for (name, expected) in cases {
            assert_eq!(parse(name), expected, "tablix cell type {}", name);
        }
        assert!(parse("rowGroupHeader").is_dimension_header());
        assert!(parse("filterLabel").is_filter());
    }

    #[test]
    fn test_cell_deserializes_backend_shape() {
        let cell: ViewCell = serde_json::from_str(
            r#"{
                "cellType": "Data",
                "value": {"type": "Number", "data": 42.5},
                "formattedValue": "42.50",
                "indentLevel": 0,
                "isBold": false,
                "isExpandable": false,
                "isCollapsed": false,
                "backgroundStyle": "Normal",
                "numberFormat": null,
                "filterFieldIndex": null,
                "groupPath": [[0, 1], [2, 4]]
            }"#,
        )
        .unwrap();

        assert_eq!(cell.cell_type, CellType::Data);
        assert_eq!(cell.value, CellValue::Number(42.5));
        assert_eq!(cell.innermost_field(), Some(2));
    }
}
