use serde::{Deserialize, Serialize};

/// Identifier of a pivot table or tablix, unique per kind within a document.
pub type TableId = u32;

/// Which extension owns a table.
///
/// Pivot and tablix tables share the same sync protocol; they differ in the
/// backend command names, the editor pane they open and whether value fields
/// can switch between aggregated and detail display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Pivot,
    Tablix,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Pivot => "pivot",
            TableKind::Tablix => "tablix",
        }
    }

    /// Task-pane identifier of the field editor for this kind.
    pub fn pane_id(&self) -> &'static str {
        match self {
            TableKind::Pivot => "pivot-editor",
            TableKind::Tablix => "tablix-editor",
        }
    }

    /// Name of the id key in backend arguments (`pivotId` / `tablixId`).
    pub fn id_key(&self) -> &'static str {
        match self {
            TableKind::Pivot => "pivotId",
            TableKind::Tablix => "tablixId",
        }
    }

    /// The kind a table becomes when converted.
    pub fn other(&self) -> TableKind {
        match self {
            TableKind::Pivot => TableKind::Tablix,
            TableKind::Tablix => TableKind::Pivot,
        }
    }

    /// Tablix value fields carry an aggregated/detail mode; pivot value
    /// fields are always aggregated.
    pub fn supports_detail_mode(&self) -> bool {
        matches!(self, TableKind::Tablix)
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single grid cell, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A grid selection as reported by the grid host.
///
/// The anchor is `start_*`; the trailing corner (`end_*`) is where the
/// cursor currently is and is treated as the active cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl Selection {
    pub fn cell(row: u32, col: u32) -> Self {
        Self {
            start_row: row,
            start_col: col,
            end_row: row,
            end_col: col,
        }
    }

    pub fn range(start: CellRef, end: CellRef) -> Self {
        Self {
            start_row: start.row,
            start_col: start.col,
            end_row: end.row,
            end_col: end.col,
        }
    }

    pub fn active_cell(&self) -> CellRef {
        CellRef::new(self.end_row, self.end_col)
    }
}

/// Rectangular grid area occupied by one table's rendered output.
///
/// Deserializes from both `PivotRegionData` (`pivotId`) and
/// `TablixRegionData` (`tablixId`) backend payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    #[serde(alias = "pivotId", alias = "tablixId")]
    pub id: TableId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
    #[serde(default)]
    pub is_empty: bool,
}

impl Region {
    pub fn new(id: TableId, start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        Self {
            id,
            name: None,
            start_row,
            start_col,
            end_row,
            end_col,
            is_empty: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn empty(mut self) -> Self {
        self.is_empty = true;
        self
    }

    /// `start <= end` on both axes.
    pub fn is_well_formed(&self) -> bool {
        self.start_row <= self.end_row && self.start_col <= self.end_col
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        cell.row >= self.start_row
            && cell.row <= self.end_row
            && cell.col >= self.start_col
            && cell.col <= self.end_col
    }

    pub fn overlaps(&self, other: &Region) -> bool {
        self.start_row <= other.end_row
            && other.start_row <= self.end_row
            && self.start_col <= other.end_col
            && other.start_col <= self.end_col
    }

    /// Position of `cell` relative to the region's top-left corner, or
    /// `None` when the cell lies outside.
    pub fn to_local(&self, cell: CellRef) -> Option<(usize, usize)> {
        if !self.contains(cell) {
            return None;
        }
        Some((
            (cell.row - self.start_row) as usize,
            (cell.col - self.start_col) as usize,
        ))
    }

    pub fn top_left(&self) -> CellRef {
        CellRef::new(self.start_row, self.start_col)
    }
}
