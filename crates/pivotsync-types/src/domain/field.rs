use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the four drop zones of a field configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Zone {
    Filters,
    Rows,
    Columns,
    Values,
}

impl Zone {
    pub const ALL: [Zone; 4] = [Zone::Filters, Zone::Rows, Zone::Columns, Zone::Values];

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Filters => "filters",
            Zone::Rows => "rows",
            Zone::Columns => "columns",
            Zone::Values => "values",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregation applied to a value field.
///
/// Serialized names match the backend's lowercase strings
/// (`"sum"`, `"countnumbers"`, `"stddevp"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationType {
    #[default]
    Sum,
    Count,
    Average,
    Min,
    Max,
    CountNumbers,
    StdDev,
    StdDevP,
    Var,
    VarP,
    Product,
}

impl AggregationType {
    pub const ALL: [AggregationType; 11] = [
        AggregationType::Sum,
        AggregationType::Count,
        AggregationType::Average,
        AggregationType::Min,
        AggregationType::Max,
        AggregationType::CountNumbers,
        AggregationType::StdDev,
        AggregationType::StdDevP,
        AggregationType::Var,
        AggregationType::VarP,
        AggregationType::Product,
    ];

    /// Wire name understood by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationType::Sum => "sum",
            AggregationType::Count => "count",
            AggregationType::Average => "average",
            AggregationType::Min => "min",
            AggregationType::Max => "max",
            AggregationType::CountNumbers => "countnumbers",
            AggregationType::StdDev => "stddev",
            AggregationType::StdDevP => "stddevp",
            AggregationType::Var => "var",
            AggregationType::VarP => "varp",
            AggregationType::Product => "product",
        }
    }

    /// Human label used when deriving value-field display names.
    pub fn label(&self) -> &'static str {
        match self {
            AggregationType::Sum => "Sum",
            AggregationType::Count => "Count",
            AggregationType::Average => "Average",
            AggregationType::Min => "Min",
            AggregationType::Max => "Max",
            AggregationType::CountNumbers => "Count Numbers",
            AggregationType::StdDev => "StdDev",
            AggregationType::StdDevP => "StdDevp",
            AggregationType::Var => "Var",
            AggregationType::VarP => "Varp",
            AggregationType::Product => "Product",
        }
    }

    /// Lenient parse: case-insensitive, accepts common aliases and falls
    /// back to `Sum` for anything unrecognised, the same way the backend
    /// interprets aggregation strings.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl FromStr for AggregationType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sum" => Ok(AggregationType::Sum),
            "count" => Ok(AggregationType::Count),
            "average" | "avg" => Ok(AggregationType::Average),
            "min" => Ok(AggregationType::Min),
            "max" => Ok(AggregationType::Max),
            "countnumbers" | "count_numbers" => Ok(AggregationType::CountNumbers),
            "stddev" | "stdev" => Ok(AggregationType::StdDev),
            "stddevp" | "stdevp" => Ok(AggregationType::StdDevP),
            "var" => Ok(AggregationType::Var),
            "varp" => Ok(AggregationType::VarP),
            "product" => Ok(AggregationType::Product),
            other => Err(crate::Error::Parse(format!(
                "unknown aggregation '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for AggregationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a tablix data field displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataFieldMode {
    Aggregated,
    Detail,
}

/// A column of the table's source range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceField {
    pub index: usize,
    pub name: String,
    pub is_numeric: bool,
}

/// A source column assigned to a zone, with its zone-specific settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneField {
    pub source_index: usize,
    pub name: String,
    pub is_numeric: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<DataFieldMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<AggregationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_items: Option<Vec<String>>,
}

impl ZoneField {
    pub fn new(source_index: usize, name: impl Into<String>, is_numeric: bool) -> Self {
        Self {
            source_index,
            name: name.into(),
            is_numeric,
            mode: None,
            aggregation: None,
            number_format: None,
            hidden_items: None,
        }
    }

    pub fn with_aggregation(mut self, aggregation: AggregationType) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    pub fn with_mode(mut self, mode: DataFieldMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn is_detail(&self) -> bool {
        self.mode == Some(DataFieldMode::Detail)
    }

    /// Name shown in the values area: `"Sum of Sales"` when aggregated,
    /// the raw source name in detail mode or without an aggregation.
    pub fn display_name(&self) -> String {
        match (self.is_detail(), self.aggregation) {
            (false, Some(agg)) => format!("{} of {}", agg.label(), self.name),
            _ => self.name.clone(),
        }
    }
}

impl From<&SourceField> for ZoneField {
    fn from(source: &SourceField) -> Self {
        ZoneField::new(source.index, source.name.clone(), source.is_numeric)
    }
}

/// Payload carried by a field pill while it is being dragged.
///
/// `from_zone`/`from_index` are present when the pill was picked up from a
/// zone rather than from the source-field list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragField {
    pub source_index: usize,
    pub name: String,
    pub is_numeric: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_zone: Option<Zone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_index: Option<usize>,
}

impl DragField {
    pub fn from_source(source: &SourceField) -> Self {
        Self {
            source_index: source.index,
            name: source.name.clone(),
            is_numeric: source.is_numeric,
            from_zone: None,
            from_index: None,
        }
    }

    pub fn from_zone(zone: Zone, index: usize, field: &ZoneField) -> Self {
        Self {
            source_index: field.source_index,
            name: field.name.clone(),
            is_numeric: field.is_numeric,
            from_zone: Some(zone),
            from_index: Some(index),
        }
    }

    /// Zone and index the pill was lifted from, when both are known.
    pub fn origin(&self) -> Option<(Zone, usize)> {
        self.from_zone.zip(self.from_index)
    }
}
