use super::Invoker;
use crate::{Error, Result};
use pivotsync_types::{
    CellRef, ConversionResponse, CreateTableRequest, DrillThroughRequest, DrillThroughResponse,
    FieldUniqueValues, Region, RegionInfo, TableId, TableKind, TableView, ToggleGroupRequest,
    UpdateFieldsRequest,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;

/// Backend operations the sync layer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Regions,
    RegionAtCell,
    View,
    UpdateFields,
    Create,
    Delete,
    RefreshCache,
    FieldUniqueValues,
    DrillThrough,
    ToggleGroup,
    /// Convert to the other kind.
    Convert,
}

impl Command {
    /// Backend command name for `kind`, or `None` when the kind has no
    /// such command.
    pub fn name(&self, kind: TableKind) -> Option<&'static str> {
        let name = match (self, kind) {
            (Command::Regions, TableKind::Pivot) => "get_pivot_regions_for_sheet",
            (Command::Regions, TableKind::Tablix) => "get_tablix_regions_for_sheet",
            (Command::RegionAtCell, TableKind::Pivot) => "get_pivot_at_cell",
            (Command::RegionAtCell, TableKind::Tablix) => "get_tablix_at_cell",
            (Command::View, TableKind::Pivot) => "get_pivot_view",
            (Command::View, TableKind::Tablix) => "get_tablix_view",
            (Command::UpdateFields, TableKind::Pivot) => "update_pivot_fields",
            (Command::UpdateFields, TableKind::Tablix) => "update_tablix_fields",
            (Command::Create, TableKind::Pivot) => "create_pivot_table",
            (Command::Create, TableKind::Tablix) => "create_tablix",
            (Command::Delete, TableKind::Pivot) => "delete_pivot_table",
            (Command::Delete, TableKind::Tablix) => "delete_tablix",
            (Command::RefreshCache, TableKind::Pivot) => "refresh_pivot_cache",
            (Command::RefreshCache, TableKind::Tablix) => "refresh_tablix_cache",
            (Command::FieldUniqueValues, TableKind::Pivot) => "get_pivot_field_unique_values",
            (Command::FieldUniqueValues, TableKind::Tablix) => "get_tablix_field_unique_values",
            (Command::DrillThrough, TableKind::Pivot) => "drill_through_to_sheet",
            (Command::DrillThrough, TableKind::Tablix) => return None,
            (Command::ToggleGroup, TableKind::Pivot) => "toggle_pivot_group",
            (Command::ToggleGroup, TableKind::Tablix) => "toggle_tablix_group",
            (Command::Convert, TableKind::Pivot) => "convert_pivot_to_tablix",
            (Command::Convert, TableKind::Tablix) => "convert_tablix_to_pivot",
        };
        Some(name)
    }
}

/// Typed client over an [`Invoker`] for one table kind.
#[derive(Clone)]
pub struct TableApi {
    kind: TableKind,
    invoker: Arc<dyn Invoker>,
}

impl TableApi {
    pub fn new(kind: TableKind, invoker: Arc<dyn Invoker>) -> Self {
        Self { kind, invoker }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    async fn call<T: DeserializeOwned>(&self, command: Command, args: Value) -> Result<T> {
        let name = command.name(self.kind).ok_or_else(|| {
            Error::UnsupportedCommand(format!("{:?} is not available for {}", command, self.kind))
        })?;

        log::debug!("invoke {} {}", name, args);
        let value = self
            .invoker
            .invoke(name, args)
            .await
            .map_err(|source| Error::Backend {
                command: name.to_string(),
                source,
            })?;

        serde_json::from_value(value).map_err(|source| Error::Decode {
            command: name.to_string(),
            source,
        })
    }

    fn id_args(&self, id: TableId) -> Value {
        let mut args = serde_json::Map::new();
        args.insert(self.kind.id_key().to_string(), json!(id));
        Value::Object(args)
    }

    /// All regions of this kind on the active sheet.
    pub async fn regions(&self) -> Result<Vec<Region>> {
        self.call(Command::Regions, json!({})).await
    }

    /// Detail of the table under `cell`, `None` when the cell is not inside one.
    pub async fn region_at_cell(&self, cell: CellRef) -> Result<Option<RegionInfo>> {
        self.call(Command::RegionAtCell, json!({ "row": cell.row, "col": cell.col }))
            .await
    }

    pub async fn view(&self, id: TableId) -> Result<TableView> {
        self.call(Command::View, self.id_args(id)).await
    }

    /// Replace the table's field configuration; returns the re-rendered view.
    pub async fn update_fields(&self, request: &UpdateFieldsRequest) -> Result<TableView> {
        self.call(Command::UpdateFields, json!({ "request": request.to_args() }))
            .await
    }

    pub async fn create(&self, request: &CreateTableRequest) -> Result<TableView> {
        self.call(Command::Create, json!({ "request": request }))
            .await
    }

    pub async fn delete(&self, id: TableId) -> Result<()> {
        let _: Value = self.call(Command::Delete, self.id_args(id)).await?;
        Ok(())
    }

    /// Re-read the source range and recompute; returns the fresh view.
    pub async fn refresh_cache(&self, id: TableId) -> Result<TableView> {
        self.call(Command::RefreshCache, self.id_args(id)).await
    }

    pub async fn field_unique_values(
        &self,
        id: TableId,
        field_index: usize,
    ) -> Result<FieldUniqueValues> {
        let mut args = self.id_args(id);
        args["fieldIndex"] = json!(field_index);
        self.call(Command::FieldUniqueValues, args).await
    }

    pub async fn drill_through(&self, request: &DrillThroughRequest) -> Result<DrillThroughResponse> {
        self.call(Command::DrillThrough, json!({ "request": request }))
            .await
    }

    /// Expand or collapse a group; returns the recomputed view.
    pub async fn toggle_group(&self, request: &ToggleGroupRequest) -> Result<TableView> {
        self.call(Command::ToggleGroup, json!({ "request": request.to_args() }))
            .await
    }

    /// Convert `id` to the other kind. The table keeps its place on the
    /// sheet under the returned id.
    pub async fn convert(&self, id: TableId) -> Result<ConversionResponse> {
        self.call(Command::Convert, json!({ "request": { "id": id } }))
            .await
    }
}
