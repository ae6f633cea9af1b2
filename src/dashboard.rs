//! One rerun of the pipeline: everything the page shows, derived from the table and the
//! current selections.

use color_eyre::Result;

use crate::chart_data::{
    prepare_bar_chart, prepare_heatmap, prepare_line_chart, prepare_pie_chart, BarChartData,
    HeatmapData, LineChartData, PieChartData,
};
use crate::classify::{all_columns, classify, ColumnClassification};
use crate::config::ChartConfig;
use crate::selection::ChartSelection;
use crate::statistics::{describe, SummaryStatistics};
use crate::table::Table;

/// Request-scoped page content. Rebuilt from scratch on every upload or selector change.
#[derive(Clone, Debug, PartialEq)]
pub struct Dashboard {
    pub classification: ColumnClassification,
    pub all_columns: Vec<String>,
    pub summary: SummaryStatistics,
    /// None when the selectors have nothing to offer
    pub bar: Option<BarChartData>,
    pub pie: Option<PieChartData>,
    pub line: Option<LineChartData>,
    /// None below two numeric columns
    pub heatmap: Option<HeatmapData>,
}

impl Dashboard {
    /// Selections naming a column outside their set (e.g. left over from a previous
    /// upload) skip the chart.
    pub fn build(table: &Table, selection: &ChartSelection, config: &ChartConfig) -> Result<Self> {
        let classification = classify(table);
        let all_columns = all_columns(table);
        let summary = describe(table, &classification)?;

        let bar = match (selection.bar_x.selected(), selection.bar_y.selected()) {
            (Some(x), Some(y)) if classification.is_categorical(x) && classification.is_numeric(y) => {
                Some(prepare_bar_chart(table, x, y, config.row_limit)?)
            }
            _ => None,
        };

        let pie = match selection.pie.selected() {
            Some(c) if classification.is_categorical(c) => Some(prepare_pie_chart(table, c)?),
            _ => None,
        };

        let line = match (selection.line_x.selected(), selection.line_y.selected()) {
            (Some(x), Some(y)) if all_columns.iter().any(|c| c == x) && classification.is_numeric(y) => {
                Some(prepare_line_chart(table, x, y, config.row_limit)?)
            }
            _ => None,
        };

        let heatmap = prepare_heatmap(table, &classification.numeric)?;

        tracing::debug!(
            bar = bar.is_some(),
            pie = pie.is_some(),
            line = line.is_some(),
            heatmap = heatmap.is_some(),
            "dashboard built"
        );

        Ok(Self {
            classification,
            all_columns,
            summary,
            bar,
            pie,
            line,
            heatmap,
        })
    }
}
