use crate::config::EditorConfig;
use crate::editor::Zones;
use pivotsync_types::{FilterZone, LayoutConfig, RegionInfo, SourceField, TableId, TableKind};
use serde::Serialize;

/// Task-pane surface of the host shell.
pub trait PaneHost: Send + Sync {
    fn open_pane(&self, pane_id: &str, data: EditorPaneData);
    fn close_pane(&self, pane_id: &str);
    /// The user dismissed the pane while a table was selected.
    fn is_manually_closed(&self, pane_id: &str) -> bool;
    /// Context keys currently active in the shell; an open editor pane
    /// contributes its pane id.
    fn active_context_keys(&self) -> Vec<String>;
}

/// Everything the field editor pane needs to render one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorPaneData {
    pub kind: TableKind,
    pub table_id: TableId,
    pub is_empty: bool,
    pub source_fields: Vec<SourceField>,
    pub zones: Zones,
    pub layout: LayoutConfig,
    pub filter_zones: Vec<FilterZone>,
}

impl EditorPaneData {
    pub fn from_region_info(kind: TableKind, info: RegionInfo, defaults: &EditorConfig) -> Self {
        let zones = Zones::from_config(
            kind,
            &info.source_fields,
            &info.field_configuration,
            defaults,
        );
        Self {
            kind,
            table_id: info.id,
            is_empty: info.is_empty,
            source_fields: info.source_fields,
            zones,
            layout: info.field_configuration.layout,
            filter_zones: info.filter_zones,
        }
    }
}
