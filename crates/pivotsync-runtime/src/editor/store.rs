use super::Zones;
use crate::config::EditorConfig;
use pivotsync_types::{
    AggregationType, DataFieldMode, DragField, FieldConfig, FieldConfiguration, LayoutConfig,
    SourceField, TableId, TableKind, UpdateFieldsRequest, ValueFieldConfig, Zone, ZoneField,
};

/// Editable field configuration of the table shown in the editor pane.
///
/// Every successful mutation sets the pending flag. Loading state from the
/// backend never does, so a freshly opened pane issues no write.
#[derive(Debug, Clone)]
pub struct FieldConfigStore {
    kind: TableKind,
    table_id: Option<TableId>,
    source_fields: Vec<SourceField>,
    zones: Zones,
    layout: LayoutConfig,
    defaults: EditorConfig,
    pending_update: bool,
}

impl FieldConfigStore {
    pub fn new(kind: TableKind, defaults: EditorConfig) -> Self {
        Self {
            kind,
            table_id: None,
            source_fields: Vec::new(),
            zones: Zones::default(),
            layout: LayoutConfig::default(),
            defaults,
            pending_update: false,
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn table_id(&self) -> Option<TableId> {
        self.table_id
    }

    pub fn source_fields(&self) -> &[SourceField] {
        &self.source_fields
    }

    pub fn zones(&self) -> &Zones {
        &self.zones
    }

    pub fn zone(&self, zone: Zone) -> &[ZoneField] {
        self.zones.get(zone)
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn has_pending_update(&self) -> bool {
        self.pending_update
    }

    /// Replace the whole state with the backend's view of table `id`.
    pub fn load_from_backend_config(
        &mut self,
        id: TableId,
        source_fields: Vec<SourceField>,
        cfg: &FieldConfiguration,
    ) {
        self.zones = Zones::from_config(self.kind, &source_fields, cfg, &self.defaults);
        self.layout = cfg.layout.clone();
        self.source_fields = source_fields;
        self.table_id = Some(id);
        self.pending_update = false;
    }

    /// Load already translated zones, as delivered to the editor pane.
    pub fn load_zones(
        &mut self,
        id: TableId,
        source_fields: Vec<SourceField>,
        zones: Zones,
        layout: LayoutConfig,
    ) {
        self.zones = zones;
        self.layout = layout;
        self.source_fields = source_fields;
        self.table_id = Some(id);
        self.pending_update = false;
    }

    /// Forget the current table.
    pub fn clear(&mut self) {
        self.table_id = None;
        self.source_fields.clear();
        self.zones = Zones::default();
        self.layout = LayoutConfig::default();
        self.pending_update = false;
    }

    fn touch(&mut self) -> bool {
        self.pending_update = true;
        true
    }

    fn value_field(&self, mut field: ZoneField) -> ZoneField {
        if field.aggregation.is_none() && !field.is_detail() {
            field.aggregation = Some(self.defaults.default_aggregation(field.is_numeric));
        }
        if self.kind.supports_detail_mode() && field.mode.is_none() {
            field.mode = Some(DataFieldMode::Aggregated);
        }
        field
    }

    fn plain_field(mut field: ZoneField) -> ZoneField {
        field.mode = None;
        field.aggregation = None;
        field.number_format = None;
        field
    }

    /// Check or uncheck a source field in the field list.
    ///
    /// Checking adds numeric fields to values and everything else to rows,
    /// unless the field is already placed. Unchecking removes it from every
    /// zone. Returns whether anything changed.
    pub fn toggle_field(&mut self, source: &SourceField, checked: bool) -> bool {
        if checked {
            if self.zones.contains(source.index) {
                return false;
            }
            let field = ZoneField::from(source);
            if source.is_numeric {
                let field = self.value_field(field);
                self.zones.values.push(field);
            } else {
                self.zones.rows.push(field);
            }
            self.touch()
        } else if self.zones.remove_everywhere(source.index) > 0 {
            self.touch()
        } else {
            false
        }
    }

    /// Take `drag`'s field out of its origin, if any, and place it in `zone`.
    ///
    /// `insert_index` is a gap slot of the target list as displayed before
    /// the drag started; `None` appends. Dropping a field back into its own
    /// slot changes nothing and schedules no write.
    pub fn drop_field(&mut self, zone: Zone, drag: &DragField, insert_index: Option<usize>) -> bool {
        let before = self.zones.clone();
        let origin = drag
            .origin()
            .and_then(|(from_zone, from_index)| {
                self.locate(from_zone, from_index, drag.source_index)
                    .map(|index| (from_zone, index))
            });

        let mut moved = None;
        let mut slot = insert_index;
        if let Some((from_zone, from_index)) = origin {
            let field = self.zones.get_mut(from_zone).remove(from_index);
            if from_zone == zone {
                slot = slot.map(|to| if to > from_index { to - 1 } else { to });
                moved = Some(field);
            }
        }
        // A field lives in at most one zone.
        self.zones.remove_everywhere(drag.source_index);

        let field = match moved {
            Some(field) => field,
            None => {
                let field = ZoneField::new(drag.source_index, drag.name.clone(), drag.is_numeric);
                match zone {
                    Zone::Values => self.value_field(field),
                    _ => Self::plain_field(field),
                }
            }
        };

        let list = self.zones.get_mut(zone);
        match slot {
            Some(index) => list.insert(index.min(list.len()), field),
            None => list.push(field),
        }
        if self.zones == before {
            return false;
        }
        self.touch()
    }

    /// Position of `source_index` in `zone`, trusting `index` only when it
    /// still points at that field.
    fn locate(&self, zone: Zone, index: usize, source_index: usize) -> Option<usize> {
        let list = self.zones.get(zone);
        match list.get(index) {
            Some(field) if field.source_index == source_index => Some(index),
            _ => list.iter().position(|f| f.source_index == source_index),
        }
    }

    pub fn remove(&mut self, zone: Zone, index: usize) -> Option<ZoneField> {
        let list = self.zones.get_mut(zone);
        if index >= list.len() {
            return None;
        }
        let field = list.remove(index);
        self.touch();
        Some(field)
    }

    /// Move the field at `from` so that it ends up at position `to`.
    pub fn reorder(&mut self, zone: Zone, from: usize, to: usize) -> bool {
        let list = self.zones.get_mut(zone);
        if from >= list.len() || from == to {
            return false;
        }
        let field = list.remove(from);
        let to = to.min(list.len());
        list.insert(to, field);
        self.touch()
    }

    pub fn set_aggregation(&mut self, index: usize, aggregation: AggregationType) -> bool {
        let Some(field) = self.zones.values.get_mut(index) else {
            return false;
        };
        if field.is_detail() || field.aggregation == Some(aggregation) {
            return false;
        }
        field.aggregation = Some(aggregation);
        self.touch()
    }

    /// Switch a value field between aggregated and detail display.
    ///
    /// Pivot value fields are always aggregated.
    pub fn set_mode(&mut self, index: usize, mode: DataFieldMode) -> bool {
        if !self.kind.supports_detail_mode() {
            log::debug!("{} value fields have no detail mode", self.kind);
            return false;
        }
        let default = self
            .zones
            .values
            .get(index)
            .map(|f| self.defaults.default_aggregation(f.is_numeric));
        let (Some(field), Some(default)) = (self.zones.values.get_mut(index), default) else {
            return false;
        };
        if field.mode == Some(mode) {
            return false;
        }
        field.mode = Some(mode);
        match mode {
            DataFieldMode::Aggregated => {
                field.aggregation.get_or_insert(default);
            }
            DataFieldMode::Detail => field.aggregation = None,
        }
        self.touch()
    }

    pub fn set_number_format(&mut self, index: usize, format: Option<String>) -> bool {
        let Some(field) = self.zones.values.get_mut(index) else {
            return false;
        };
        if field.number_format == format {
            return false;
        }
        field.number_format = format;
        self.touch()
    }

    /// Merge the set options of `patch` into the layout.
    pub fn set_layout(&mut self, patch: &LayoutConfig) -> bool {
        let mut merged = self.layout.clone();
        merged.merge(patch);
        if merged == self.layout {
            return false;
        }
        self.layout = merged;
        self.touch()
    }

    /// Hide the given items of a filter, row or column field. An empty list
    /// shows everything.
    pub fn set_hidden_items(&mut self, zone: Zone, index: usize, items: Vec<String>) -> bool {
        if zone == Zone::Values {
            return false;
        }
        let Some(field) = self.zones.get_mut(zone).get_mut(index) else {
            return false;
        };
        let items = (!items.is_empty()).then_some(items);
        if field.hidden_items == items {
            return false;
        }
        field.hidden_items = items;
        self.touch()
    }

    /// Drag-out removal: the field left the editor through a drag that
    /// ended outside every zone.
    pub fn remove_dragged(&mut self, drag: &DragField) -> bool {
        let Some((zone, index)) = drag.origin() else {
            return false;
        };
        match self.locate(zone, index, drag.source_index) {
            Some(index) => self.remove(zone, index).is_some(),
            None => {
                log::debug!(
                    "drag-out of field {} from {} ignored; no longer there",
                    drag.source_index,
                    zone
                );
                false
            }
        }
    }

    /// Wire request for the current state; `None` before a table is loaded.
    pub fn build_request(&self) -> Option<UpdateFieldsRequest> {
        let table_id = self.table_id?;
        let plain = |fields: &[ZoneField]| -> Vec<FieldConfig> {
            fields
                .iter()
                .map(|f| FieldConfig {
                    source_index: f.source_index,
                    name: f.name.clone(),
                    hidden_items: f.hidden_items.clone(),
                })
                .collect()
        };

        let value_fields = self
            .zones
            .values
            .iter()
            .map(|f| ValueFieldConfig {
                source_index: f.source_index,
                name: f.display_name(),
                mode: f.mode,
                aggregation: f.aggregation,
                number_format: f.number_format.clone(),
            })
            .collect();

        Some(UpdateFieldsRequest {
            kind: self.kind,
            table_id,
            row_fields: plain(&self.zones.rows),
            column_fields: plain(&self.zones.columns),
            value_fields,
            filter_fields: plain(&self.zones.filters),
            layout: self.layout.clone(),
        })
    }

    /// Clear the pending flag and return the request it stood for.
    pub fn take_pending_request(&mut self) -> Option<UpdateFieldsRequest> {
        if !self.pending_update {
            return None;
        }
        self.pending_update = false;
        self.build_request()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pivotsync_types::ZoneFieldInfo;

    fn source(index: usize, name: &str, is_numeric: bool) -> SourceField {
        SourceField {
            index,
            name: name.to_string(),
            is_numeric,
        }
    }

    fn store(kind: TableKind) -> FieldConfigStore {
        let mut store = FieldConfigStore::new(kind, EditorConfig::default());
        store.load_from_backend_config(
            7,
            vec![
                source(0, "Region", false),
                source(1, "Product", false),
                source(2, "Sales", true),
                source(3, "Units", true),
            ],
            &FieldConfiguration::default(),
        );
        store
    }

    fn names(fields: &[ZoneField]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    fn abc(store: &mut FieldConfigStore) {
        for i in 0..3 {
            let src = store.source_fields()[i].clone();
            store.drop_field(Zone::Rows, &DragField::from_source(&src), None);
        }
        store.take_pending_request();
    }

    #[test]
    fn test_load_does_not_mark_pending() {
        let store = store(TableKind::Pivot);
        assert!(!store.has_pending_update());
        assert_eq!(store.table_id(), Some(7));
    }

    #[test]
    fn test_toggle_field_is_idempotent() {
        let mut store = store(TableKind::Pivot);
        let sales = source(2, "Sales", true);

        assert!(store.toggle_field(&sales, true));
        assert!(!store.toggle_field(&sales, true));
        assert_eq!(names(store.zone(Zone::Values)), vec!["Sales"]);
        assert_eq!(store.zone(Zone::Values)[0].aggregation, Some(AggregationType::Sum));

        let region = source(0, "Region", false);
        store.toggle_field(&region, true);
        assert_eq!(names(store.zone(Zone::Rows)), vec!["Region"]);

        assert!(store.toggle_field(&sales, false));
        assert!(!store.toggle_field(&sales, false));
        assert!(store.zone(Zone::Values).is_empty());
    }

    #[test]
    fn test_reorder_moves_to_final_position() {
        let mut store = store(TableKind::Pivot);
        abc(&mut store);
        assert_eq!(names(store.zone(Zone::Rows)), vec!["Region", "Product", "Sales"]);

        store.reorder(Zone::Rows, 0, 2);
        assert_eq!(names(store.zone(Zone::Rows)), vec!["Product", "Sales", "Region"]);

        store.reorder(Zone::Rows, 2, 0);
        assert_eq!(names(store.zone(Zone::Rows)), vec!["Region", "Product", "Sales"]);
        assert!(store.has_pending_update());
    }

    #[test]
    fn test_reorder_out_of_range_is_noop() {
        let mut store = store(TableKind::Pivot);
        abc(&mut store);
        assert!(!store.reorder(Zone::Rows, 5, 0));
        assert!(!store.reorder(Zone::Rows, 1, 1));
        assert!(!store.has_pending_update());
    }

    #[test]
    fn test_drop_within_zone_uses_gap_slots() {
        let mut store = store(TableKind::Pivot);
        abc(&mut store);
        let first = DragField::from_zone(Zone::Rows, 0, &store.zone(Zone::Rows)[0]);

        // Gap 2 sits between Product and Sales.
        store.drop_field(Zone::Rows, &first, Some(2));
        assert_eq!(names(store.zone(Zone::Rows)), vec!["Product", "Region", "Sales"]);
    }

    #[test]
    fn test_drop_into_values_sets_default_aggregation() {
        let mut store = store(TableKind::Tablix);
        abc(&mut store);
        let region = DragField::from_zone(Zone::Rows, 0, &store.zone(Zone::Rows)[0]);

        store.drop_field(Zone::Values, &region, Some(0));
        assert_eq!(names(store.zone(Zone::Rows)), vec!["Product", "Sales"]);
        let value = &store.zone(Zone::Values)[0];
        assert_eq!(value.aggregation, Some(AggregationType::Count));
        assert_eq!(value.mode, Some(DataFieldMode::Aggregated));

        let back = DragField::from_zone(Zone::Values, 0, value);
        store.drop_field(Zone::Columns, &back, None);
        assert!(store.zone(Zone::Values).is_empty());
        assert_eq!(store.zone(Zone::Columns)[0].aggregation, None);
        assert_eq!(store.zone(Zone::Columns)[0].mode, None);
    }

    #[test]
    fn test_drop_from_field_list_keeps_single_placement() {
        let mut store = store(TableKind::Pivot);
        abc(&mut store);
        let product = DragField::from_source(&source(1, "Product", false));

        store.drop_field(Zone::Filters, &product, None);
        assert_eq!(names(store.zone(Zone::Filters)), vec!["Product"]);
        assert_eq!(names(store.zone(Zone::Rows)), vec!["Region", "Sales"]);
    }

    #[test]
    fn test_set_mode_round_trip() {
        let mut store = store(TableKind::Tablix);
        store.toggle_field(&source(2, "Sales", true), true);
        store.set_aggregation(0, AggregationType::Average);

        assert!(store.set_mode(0, DataFieldMode::Detail));
        assert_eq!(store.zone(Zone::Values)[0].aggregation, None);
        assert_eq!(store.zone(Zone::Values)[0].display_name(), "Sales");
        assert!(!store.set_aggregation(0, AggregationType::Max));

        assert!(store.set_mode(0, DataFieldMode::Aggregated));
        assert_eq!(store.zone(Zone::Values)[0].aggregation, Some(AggregationType::Sum));
    }

    #[test]
    fn test_pivot_has_no_detail_mode() {
        let mut store = store(TableKind::Pivot);
        store.toggle_field(&source(3, "Units", true), true);
        assert!(!store.set_mode(0, DataFieldMode::Detail));
        assert_eq!(store.zone(Zone::Values)[0].mode, None);
    }

    #[test]
    fn test_remove_dragged_guards_stale_index() {
        let mut store = store(TableKind::Pivot);
        abc(&mut store);
        let sales = DragField::from_zone(Zone::Rows, 2, &store.zone(Zone::Rows)[2]);
        store.remove(Zone::Rows, 0);

        assert!(store.remove_dragged(&sales));
        assert_eq!(names(store.zone(Zone::Rows)), vec!["Product"]);
        assert!(!store.remove_dragged(&sales));
    }

    #[test]
    fn test_set_layout_and_hidden_items() {
        let mut store = store(TableKind::Pivot);
        abc(&mut store);
        let patch = LayoutConfig {
            show_row_grand_totals: Some(false),
            ..Default::default()
        };
        assert!(store.set_layout(&patch));
        assert!(!store.set_layout(&patch));

        assert!(store.set_hidden_items(Zone::Rows, 0, vec!["East".to_string()]));
        assert!(store.set_hidden_items(Zone::Rows, 0, vec![]));
        assert_eq!(store.zone(Zone::Rows)[0].hidden_items, None);
        assert!(!store.set_hidden_items(Zone::Values, 0, vec!["x".to_string()]));
    }

    #[test]
    fn test_take_pending_request_once_per_batch() {
        let mut store = store(TableKind::Pivot);
        store.toggle_field(&source(0, "Region", false), true);
        store.toggle_field(&source(2, "Sales", true), true);

        let request = store.take_pending_request().unwrap();
        assert_eq!(request.row_fields.len(), 1);
        assert_eq!(request.value_fields[0].name, "Sum of Sales");
        assert!(store.take_pending_request().is_none());
    }

    #[test]
    fn test_build_request_round_trips_backend_config() {
        let info = |source_index: usize, name: &str, aggregation: Option<&str>| ZoneFieldInfo {
            source_index,
            name: name.to_string(),
            is_numeric: aggregation.is_some(),
            mode: None,
            aggregation: aggregation.map(str::to_string),
            number_format: None,
            hidden_items: None,
        };
        let cfg = FieldConfiguration {
            filter_fields: vec![info(1, "Product", None)],
            row_fields: vec![info(0, "Region", None)],
            value_fields: vec![info(2, "Average of Sales", Some("average"))],
            ..Default::default()
        };

        let mut store = FieldConfigStore::new(TableKind::Pivot, EditorConfig::default());
        store.load_from_backend_config(
            7,
            vec![source(0, "Region", false), source(1, "Product", false), source(2, "Sales", true)],
            &cfg,
        );

        let request = store.build_request().unwrap();
        assert_eq!(request.table_id, 7);
        assert_eq!(request.filter_fields[0].source_index, 1);
        assert_eq!(request.row_fields[0].source_index, 0);
        assert!(request.column_fields.is_empty());
        assert_eq!(request.value_fields[0].aggregation, Some(AggregationType::Average));
        assert_eq!(request.value_fields[0].name, "Average of Sales");
        assert!(!store.has_pending_update());
    }

    #[test]
    fn test_drop_into_own_slot_is_noop() {
        let mut store = store(TableKind::Pivot);
        abc(&mut store);
        let middle = DragField::from_zone(Zone::Rows, 1, &store.zone(Zone::Rows)[1]);

        // The gaps on either side of Product.
        assert!(!store.drop_field(Zone::Rows, &middle, Some(1)));
        assert!(!store.drop_field(Zone::Rows, &middle, Some(2)));
        assert_eq!(names(store.zone(Zone::Rows)), vec!["Region", "Product", "Sales"]);
        assert!(!store.has_pending_update());

        let last = DragField::from_zone(Zone::Rows, 2, &store.zone(Zone::Rows)[2]);
        assert!(!store.drop_field(Zone::Rows, &last, None));
        assert!(store.drop_field(Zone::Rows, &middle, Some(0)));
        assert!(store.has_pending_update());
    }

    #[test]
    fn test_tablix_build_request_round_trips_modes() {
        let data = |source_index: usize, name: &str, mode: DataFieldMode, aggregation: Option<&str>| {
            ZoneFieldInfo {
                source_index,
                name: name.to_string(),
                is_numeric: true,
                mode: Some(mode),
                aggregation: aggregation.map(str::to_string),
                number_format: None,
                hidden_items: None,
            }
        };
        let cfg = FieldConfiguration {
            value_fields: vec![
                data(2, "Sum of Sales", DataFieldMode::Aggregated, Some("sum")),
                data(3, "Units", DataFieldMode::Detail, None),
            ],
            ..Default::default()
        };

        let mut store = FieldConfigStore::new(TableKind::Tablix, EditorConfig::default());
        store.load_from_backend_config(
            4,
            vec![source(2, "Sales", true), source(3, "Units", true)],
            &cfg,
        );

        let request = store.build_request().unwrap();
        let values = &request.value_fields;
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].source_index, 2);
        assert_eq!(values[0].mode, Some(DataFieldMode::Aggregated));
        assert_eq!(values[0].aggregation, Some(AggregationType::Sum));
        assert_eq!(values[0].name, "Sum of Sales");
        assert_eq!(values[1].source_index, 3);
        assert_eq!(values[1].mode, Some(DataFieldMode::Detail));
        assert_eq!(values[1].aggregation, None);
        assert_eq!(values[1].name, "Units");
        assert!(!store.has_pending_update());
    }

    #[test]
    fn test_build_request_requires_table() {
        let store = FieldConfigStore::new(TableKind::Tablix, EditorConfig::default());
        assert!(store.build_request().is_none());
    }
}
