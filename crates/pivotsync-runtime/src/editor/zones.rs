use crate::config::EditorConfig;
use pivotsync_types::{
    AggregationType, DataFieldMode, FieldConfiguration, LayoutConfig, SourceField, TableKind,
    Zone, ZoneField, ZoneFieldInfo,
};
use serde::Serialize;

/// Ordered field lists of the four editor zones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Zones {
    pub filters: Vec<ZoneField>,
    pub rows: Vec<ZoneField>,
    pub columns: Vec<ZoneField>,
    pub values: Vec<ZoneField>,
}

impl Zones {
    pub fn get(&self, zone: Zone) -> &[ZoneField] {
        match zone {
            Zone::Filters => &self.filters,
            Zone::Rows => &self.rows,
            Zone::Columns => &self.columns,
            Zone::Values => &self.values,
        }
    }

    pub(crate) fn get_mut(&mut self, zone: Zone) -> &mut Vec<ZoneField> {
        match zone {
            Zone::Filters => &mut self.filters,
            Zone::Rows => &mut self.rows,
            Zone::Columns => &mut self.columns,
            Zone::Values => &mut self.values,
        }
    }

    /// Zone and position holding `source_index`, scanning in zone order.
    pub fn position_of(&self, source_index: usize) -> Option<(Zone, usize)> {
        Zone::ALL.into_iter().find_map(|zone| {
            self.get(zone)
                .iter()
                .position(|f| f.source_index == source_index)
                .map(|index| (zone, index))
        })
    }

    pub fn contains(&self, source_index: usize) -> bool {
        self.position_of(source_index).is_some()
    }

    /// Remove `source_index` from every zone; returns how many entries went.
    ///
    /// Scans all zones even though a field should sit in at most one.
    pub(crate) fn remove_everywhere(&mut self, source_index: usize) -> usize {
        Zone::ALL
            .into_iter()
            .map(|zone| {
                let list = self.get_mut(zone);
                let before = list.len();
                list.retain(|f| f.source_index != source_index);
                before - list.len()
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        Zone::ALL.into_iter().all(|zone| self.get(zone).is_empty())
    }

    /// Translate a backend field configuration into editor zones.
    ///
    /// Backend value names are display names ("Sum of Sales"), so names are
    /// restored from `source_fields` when the index is known there.
    pub fn from_config(
        kind: TableKind,
        source_fields: &[SourceField],
        cfg: &FieldConfiguration,
        defaults: &EditorConfig,
    ) -> Self {
        let plain = |infos: &[ZoneFieldInfo]| -> Vec<ZoneField> {
            infos
                .iter()
                .map(|info| {
                    let mut field = base_field(info, source_fields);
                    field.hidden_items = info.hidden_items.clone();
                    field
                })
                .collect()
        };

        let values = cfg
            .value_fields
            .iter()
            .map(|info| {
                let mut field = base_field(info, source_fields);
                field.number_format = info.number_format.clone();
                field.mode = match kind {
                    TableKind::Tablix => Some(info.mode.unwrap_or(DataFieldMode::Aggregated)),
                    TableKind::Pivot => None,
                };
                field.aggregation = if field.is_detail() {
                    None
                } else {
                    Some(
                        info.aggregation
                            .as_deref()
                            .map(AggregationType::parse_lenient)
                            .unwrap_or_else(|| defaults.default_aggregation(field.is_numeric)),
                    )
                };
                field
            })
            .collect();

        Self {
            filters: plain(&cfg.filter_fields),
            rows: plain(&cfg.row_fields),
            columns: plain(&cfg.column_fields),
            values,
        }
    }

    /// Backend-shaped configuration of these zones, as the backend reports
    /// it after an update.
    pub fn to_config(&self, layout: &LayoutConfig) -> FieldConfiguration {
        let infos = |fields: &[ZoneField]| -> Vec<ZoneFieldInfo> {
            fields
                .iter()
                .map(|f| ZoneFieldInfo {
                    source_index: f.source_index,
                    name: f.name.clone(),
                    is_numeric: f.is_numeric,
                    mode: None,
                    aggregation: None,
                    number_format: None,
                    hidden_items: f.hidden_items.clone(),
                })
                .collect()
        };

        let value_fields = self
            .values
            .iter()
            .map(|f| ZoneFieldInfo {
                source_index: f.source_index,
                name: f.display_name(),
                is_numeric: f.is_numeric,
                mode: f.mode,
                aggregation: f.aggregation.map(|a| a.as_str().to_string()),
                number_format: f.number_format.clone(),
                hidden_items: None,
            })
            .collect();

        FieldConfiguration {
            row_fields: infos(&self.rows),
            column_fields: infos(&self.columns),
            value_fields,
            filter_fields: infos(&self.filters),
            layout: layout.clone(),
        }
    }
}

fn base_field(info: &ZoneFieldInfo, source_fields: &[SourceField]) -> ZoneField {
    match source_fields.iter().find(|s| s.index == info.source_index) {
        Some(source) => ZoneField::from(source),
        None => ZoneField::new(info.source_index, info.name.clone(), info.is_numeric),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(source_index: usize, name: &str, aggregation: Option<&str>) -> ZoneFieldInfo {
        ZoneFieldInfo {
            source_index,
            name: name.to_string(),
            is_numeric: aggregation.is_some(),
            mode: None,
            aggregation: aggregation.map(str::to_string),
            number_format: None,
            hidden_items: None,
        }
    }

    fn sources() -> Vec<SourceField> {
        vec![
            SourceField { index: 0, name: "Region".to_string(), is_numeric: false },
            SourceField { index: 2, name: "Sales".to_string(), is_numeric: true },
        ]
    }

    #[test]
    fn test_value_names_restored_from_sources() {
        let cfg = FieldConfiguration {
            row_fields: vec![info(0, "Region", None)],
            value_fields: vec![info(2, "Sum of Sales", Some("sum"))],
            ..Default::default()
        };

        let zones = Zones::from_config(TableKind::Pivot, &sources(), &cfg, &EditorConfig::default());
        assert_eq!(zones.values[0].name, "Sales");
        assert_eq!(zones.values[0].aggregation, Some(AggregationType::Sum));
        assert_eq!(zones.values[0].mode, None);
        assert_eq!(zones.rows[0].aggregation, None);
    }

    #[test]
    fn test_tablix_detail_values_have_no_aggregation() {
        let mut detail = info(2, "Sales", None);
        detail.mode = Some(DataFieldMode::Detail);
        let cfg = FieldConfiguration {
            value_fields: vec![detail, info(5, "Count of Units", None)],
            ..Default::default()
        };

        let zones = Zones::from_config(TableKind::Tablix, &sources(), &cfg, &EditorConfig::default());
        assert!(zones.values[0].is_detail());
        assert_eq!(zones.values[0].aggregation, None);
        assert_eq!(zones.values[1].mode, Some(DataFieldMode::Aggregated));
        assert_eq!(zones.values[1].aggregation, Some(AggregationType::Count));
        assert_eq!(zones.values[1].name, "Count of Units");
    }

    #[test]
    fn test_remove_everywhere_tolerates_duplicates() {
        let mut zones = Zones::default();
        zones.rows.push(ZoneField::new(1, "Product", false));
        zones.filters.push(ZoneField::new(1, "Product", false));
        assert_eq!(zones.position_of(1), Some((Zone::Filters, 0)));
        assert_eq!(zones.remove_everywhere(1), 2);
        assert!(zones.is_empty());
    }
}
