use serde::{Deserialize, Serialize};

/// Layout options of a table.
///
/// Pivot and tablix report different option sets; this struct carries the
/// union. Options the backend did not report stay `None` and are omitted
/// from update requests, so a pivot layout never leaks tablix keys and vice
/// versa.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_row_grand_totals: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_column_grand_totals: Option<bool>,
    /// Pivot: `"compact"`, `"outline"` or `"tabular"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_layout: Option<String>,
    /// Tablix: `"stepped"` or `"block"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_row_labels: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_group_labels: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_empty_rows: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_empty_cols: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_empty_groups: Option<bool>,
    /// Pivot: `"columns"` or `"rows"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_position: Option<String>,
}

impl LayoutConfig {
    /// Overlay every option set in `patch` onto `self`.
    pub fn merge(&mut self, patch: &LayoutConfig) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if patch.$field.is_some() {
                    self.$field = patch.$field.clone();
                })*
            };
        }
        take!(
            show_row_grand_totals,
            show_column_grand_totals,
            report_layout,
            group_layout,
            repeat_row_labels,
            repeat_group_labels,
            show_empty_rows,
            show_empty_cols,
            show_empty_groups,
            values_position
        );
    }
}
