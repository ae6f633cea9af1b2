//! Prepare chart data from the loaded table: one preparation per chart section.
//!
//! Bar and line charts read a lazy two-column projection, every complete row unless a
//! row limit is configured. The pie chart counts values and the heatmap wraps the
//! correlation matrix.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::datatypes::{DataType, TimeUnit};
use polars::prelude::*;
use std::collections::HashMap;

use crate::statistics::{correlation_matrix, frequency_counts, CorrelationMatrix};
use crate::table::Table;

/// Describes how x-axis numeric values map back to labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XAxisTemporalKind {
    Numeric,
    Date,       // x = days since Unix epoch (f64)
    DatetimeUs, // x = microseconds since epoch
    DatetimeMs,
    DatetimeNs,
    Time,        // x = nanoseconds since midnight
    Categorical, // x = index into the chart's category list
}

/// Keep the first `row_limit` rows, or all of them without a limit.
fn limit_rows(lf: LazyFrame, row_limit: Option<usize>) -> LazyFrame {
    match row_limit {
        Some(limit) => lf.slice(0, IdxSize::try_from(limit).unwrap_or(IdxSize::MAX)),
        None => lf,
    }
}

fn x_axis_temporal_kind(dtype: &DataType) -> XAxisTemporalKind {
    match dtype {
        DataType::Date => XAxisTemporalKind::Date,
        DataType::Datetime(unit, _) => match unit {
            TimeUnit::Nanoseconds => XAxisTemporalKind::DatetimeNs,
            TimeUnit::Microseconds => XAxisTemporalKind::DatetimeUs,
            TimeUnit::Milliseconds => XAxisTemporalKind::DatetimeMs,
        },
        DataType::Time => XAxisTemporalKind::Time,
        dt if dt.is_numeric() || dt.is_bool() => XAxisTemporalKind::Numeric,
        _ => XAxisTemporalKind::Categorical,
    }
}

/// One bar per row sharing the category, in row order.
#[derive(Clone, Debug, PartialEq)]
pub struct BarGroup {
    pub category: String,
    pub values: Vec<f64>,
}

impl BarGroup {
    /// Bar positions for the group drawn at slot `index`: rows sharing a category sit
    /// side by side within `index ± 0.4`.
    pub fn points(&self, index: usize) -> Vec<(f64, f64)> {
        let k = self.values.len() as f64;
        self.values
            .iter()
            .enumerate()
            .map(|(j, y)| {
                let offset = if self.values.len() == 1 {
                    0.0
                } else {
                    -0.4 + 0.8 * (j as f64 + 0.5) / k
                };
                (index as f64 + offset, *y)
            })
            .collect()
    }
}

/// Bar chart: rows grouped by category (first appearance order), no aggregation.
#[derive(Clone, Debug, PartialEq)]
pub struct BarChartData {
    pub title: String,
    pub x_column: String,
    pub y_column: String,
    pub groups: Vec<BarGroup>,
}

pub fn prepare_bar_chart(
    table: &Table,
    x_column: &str,
    y_column: &str,
    row_limit: Option<usize>,
) -> Result<BarChartData> {
    let lf = table
        .lazy()
        .select([
            col(x_column).cast(DataType::String).alias("x"),
            col(y_column).cast(DataType::Float64).alias("y"),
        ])
        .drop_nulls(None);
    let df = limit_rows(lf, row_limit).collect()?;

    let xs = df.column("x")?.str()?;
    let ys = df.column("y")?.f64()?;

    let mut groups: Vec<BarGroup> = Vec::new();
    let mut slot: HashMap<String, usize> = HashMap::new();
    for (x, y) in xs.iter().zip(ys.iter()) {
        let (Some(x), Some(y)) = (x, y) else {
            continue;
        };
        if !y.is_finite() {
            continue;
        }
        match slot.get(x) {
            Some(&i) => groups[i].values.push(y),
            None => {
                slot.insert(x.to_string(), groups.len());
                groups.push(BarGroup {
                    category: x.to_string(),
                    values: vec![y],
                });
            }
        }
    }

    Ok(BarChartData {
        title: format!("{} by {}", y_column, x_column),
        x_column: x_column.to_string(),
        y_column: y_column.to_string(),
        groups,
    })
}

/// Pie chart: one slice per distinct value, most frequent first.
#[derive(Clone, Debug, PartialEq)]
pub struct PieChartData {
    pub title: String,
    pub column: String,
    pub slices: Vec<(String, usize)>,
}

impl PieChartData {
    pub fn total(&self) -> usize {
        self.slices.iter().map(|(_, n)| n).sum()
    }

    /// Share of slice `i` in `0.0..=1.0`
    pub fn fraction(&self, i: usize) -> f64 {
        let total = self.total();
        match self.slices.get(i) {
            Some((_, n)) if total > 0 => *n as f64 / total as f64,
            _ => 0.0,
        }
    }
}

pub fn prepare_pie_chart(table: &Table, column: &str) -> Result<PieChartData> {
    let series = table.df().column(column)?.as_materialized_series();
    Ok(PieChartData {
        title: format!("Distribution of {}", column),
        column: column.to_string(),
        slices: frequency_counts(series)?,
    })
}

/// Line chart: (x, y) pairs in ascending x order. For text x, `x_categories` holds the
/// distinct values and x is their index.
#[derive(Clone, Debug, PartialEq)]
pub struct LineChartData {
    pub title: String,
    pub x_column: String,
    pub y_column: String,
    pub points: Vec<(f64, f64)>,
    pub x_axis_kind: XAxisTemporalKind,
    pub x_categories: Vec<String>,
}

impl LineChartData {
    pub fn format_x(&self, v: f64) -> String {
        match self.x_axis_kind {
            XAxisTemporalKind::Categorical => {
                let idx = v.round();
                if idx >= 0.0 {
                    self.x_categories
                        .get(idx as usize)
                        .cloned()
                        .unwrap_or_default()
                } else {
                    String::new()
                }
            }
            kind => format_x_axis_label(v, kind),
        }
    }
}

/// Sorts rows by x (stable, so ties keep row order) and plots every complete pair, or
/// the first `row_limit` of them when a limit is set.
pub fn prepare_line_chart(
    table: &Table,
    x_column: &str,
    y_column: &str,
    row_limit: Option<usize>,
) -> Result<LineChartData> {
    let x_dtype = table
        .dtype(x_column)
        .ok_or_else(|| eyre!("x column '{}' not in table", x_column))?
        .clone();
    let x_axis_kind = x_axis_temporal_kind(&x_dtype);

    // X expr: temporal as Int64 ordinal, numbers and bools as f64, anything else as text
    let x_expr: Expr = match x_axis_kind {
        XAxisTemporalKind::Numeric => col(x_column).cast(DataType::Float64),
        XAxisTemporalKind::Categorical => col(x_column).cast(DataType::String),
        _ => col(x_column).cast(DataType::Int64),
    };

    let options = SortMultipleOptions {
        descending: vec![false],
        maintain_order: true,
        ..Default::default()
    };
    let lf = table
        .lazy()
        .select([
            x_expr.alias("x"),
            col(y_column).cast(DataType::Float64).alias("y"),
        ])
        .drop_nulls(None)
        .sort_by_exprs(vec![col("x")], options);
    let df = limit_rows(lf, row_limit).collect()?;

    let ys = df.column("y")?.f64()?;
    let mut points = Vec::with_capacity(df.height());
    let mut x_categories = Vec::new();

    if x_axis_kind == XAxisTemporalKind::Categorical {
        let xs = df.column("x")?.str()?;
        for (x, y) in xs.iter().zip(ys.iter()) {
            let (Some(x), Some(y)) = (x, y) else {
                continue;
            };
            // sorted input: a new value is always the last category
            if x_categories.last().map(String::as_str) != Some(x) {
                x_categories.push(x.to_string());
            }
            if y.is_finite() {
                points.push(((x_categories.len() - 1) as f64, y));
            }
        }
    } else {
        let xs = df.column("x")?.cast(&DataType::Float64)?;
        let xs = xs.f64()?;
        for (x, y) in xs.iter().zip(ys.iter()) {
            if let (Some(x), Some(y)) = (x, y) {
                if x.is_finite() && y.is_finite() {
                    points.push((x, y));
                }
            }
        }
    }

    Ok(LineChartData {
        title: format!("{} over {}", y_column, x_column),
        x_column: x_column.to_string(),
        y_column: y_column.to_string(),
        points,
        x_axis_kind,
        x_categories,
    })
}

/// Correlation heatmap over every numeric column.
#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapData {
    pub title: String,
    pub matrix: CorrelationMatrix,
}

impl HeatmapData {
    /// Cell text: two decimals, `nan` when undefined.
    pub fn annotation(&self, row: usize, col: usize) -> String {
        match self.matrix.get(row, col) {
            Some(v) if !v.is_nan() => format!("{:.2}", v),
            _ => "nan".to_string(),
        }
    }

    /// Color scale bounds: the smallest and largest defined coefficient.
    pub fn value_range(&self) -> (f64, f64) {
        let (lo, hi) = self
            .matrix
            .correlations
            .iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), v| {
                (a.min(*v), b.max(*v))
            });
        if lo < hi {
            (lo, hi)
        } else {
            (-1.0, 1.0)
        }
    }

    /// Cell color, None for undefined coefficients.
    pub fn cell_rgb(&self, row: usize, col: usize) -> Option<(u8, u8, u8)> {
        let v = self.matrix.get(row, col)?;
        if v.is_nan() {
            return None;
        }
        let (lo, hi) = self.value_range();
        Some(coolwarm((v - lo) / (hi - lo)))
    }
}

/// None when there are fewer than two numeric columns: the heatmap is skipped.
pub fn prepare_heatmap(table: &Table, numeric_columns: &[String]) -> Result<Option<HeatmapData>> {
    if numeric_columns.len() < 2 {
        return Ok(None);
    }
    Ok(Some(HeatmapData {
        title: "Correlation Heatmap".to_string(),
        matrix: correlation_matrix(table, numeric_columns)?,
    }))
}

const COOLWARM_LOW: (f64, f64, f64) = (59.0, 76.0, 192.0);
const COOLWARM_MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
const COOLWARM_HIGH: (f64, f64, f64) = (180.0, 4.0, 38.0);

/// Diverging blue-grey-red scale; `t` is clamped to `0.0..=1.0`.
pub fn coolwarm(t: f64) -> (u8, u8, u8) {
    let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
    let (from, to, s) = if t < 0.5 {
        (COOLWARM_LOW, COOLWARM_MID, t * 2.0)
    } else {
        (COOLWARM_MID, COOLWARM_HIGH, (t - 0.5) * 2.0)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * s).round() as u8;
    (lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

pub fn format_axis_label(v: f64) -> String {
    if v.abs() >= 1e6 || (v.abs() < 1e-2 && v != 0.0) {
        format!("{:.2e}", v)
    } else {
        format!("{:.2}", v)
    }
}

/// Format x-axis label: dates/datetimes/times when kind is temporal, else numeric.
pub fn format_x_axis_label(v: f64, kind: XAxisTemporalKind) -> String {
    use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

    match kind {
        XAxisTemporalKind::Numeric | XAxisTemporalKind::Categorical => format_axis_label(v),
        XAxisTemporalKind::Date => {
            const UNIX_EPOCH_CE_DAYS: i32 = 719_163;
            let days = v.trunc() as i32;
            match NaiveDate::from_num_days_from_ce_opt(UNIX_EPOCH_CE_DAYS.saturating_add(days)) {
                Some(d) => d.format("%Y-%m-%d").to_string(),
                None => format_axis_label(v),
            }
        }
        XAxisTemporalKind::DatetimeUs => DateTime::from_timestamp_micros(v.trunc() as i64)
            .map(|dt: DateTime<Utc>| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| format_axis_label(v)),
        XAxisTemporalKind::DatetimeMs => DateTime::from_timestamp_millis(v.trunc() as i64)
            .map(|dt: DateTime<Utc>| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| format_axis_label(v)),
        XAxisTemporalKind::DatetimeNs => {
            let millis = (v.trunc() as i64) / 1_000_000;
            DateTime::from_timestamp_millis(millis)
                .map(|dt: DateTime<Utc>| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| format_axis_label(v))
        }
        XAxisTemporalKind::Time => {
            let nsecs = v.trunc() as u64;
            let secs = (nsecs / 1_000_000_000) as u32;
            let subsec = (nsecs % 1_000_000_000) as u32;
            match NaiveTime::from_num_seconds_from_midnight_opt(secs, subsec) {
                Some(t) => t.format("%H:%M:%S").to_string(),
                None => format_axis_label(v),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_groups_rows_without_aggregating() {
        let table = Table::new(
            df!(
                "region" => &["north", "south", "north"],
                "sales" => &[10.0, 5.0, 7.0]
            )
            .unwrap(),
        );
        let bar = prepare_bar_chart(&table, "region", "sales", None).unwrap();
        assert_eq!(bar.title, "sales by region");
        assert_eq!(
            bar.groups,
            vec![
                BarGroup {
                    category: "north".into(),
                    values: vec![10.0, 7.0]
                },
                BarGroup {
                    category: "south".into(),
                    values: vec![5.0]
                },
            ]
        );
        let pts = bar.groups[0].points(0);
        assert!(pts[0].0 < pts[1].0);
        assert!(pts.iter().all(|(x, _)| x.abs() <= 0.4));
        assert_eq!(bar.groups[1].points(1), vec![(1.0, 5.0)]);
    }

    #[test]
    fn bar_respects_row_limit_and_skips_nulls() {
        let table = Table::new(
            df!(
                "region" => &[Some("a"), None, Some("b"), Some("c")],
                "sales" => &[Some(1.0), Some(2.0), None, Some(4.0)]
            )
            .unwrap(),
        );
        let bar = prepare_bar_chart(&table, "region", "sales", Some(1)).unwrap();
        assert_eq!(bar.groups.len(), 1);
        assert_eq!(bar.groups[0].category, "a");
    }

    #[test]
    fn charts_plot_every_row_without_a_limit() {
        let n = 12_000;
        let region: Vec<String> = (0..n).map(|i| format!("r{}", i % 3)).collect();
        let sales: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let table = Table::new(df!("region" => region, "sales" => sales).unwrap());

        let bar = prepare_bar_chart(&table, "region", "sales", None).unwrap();
        let bar_values: usize = bar.groups.iter().map(|g| g.values.len()).sum();
        assert_eq!(bar_values, n);

        let line = prepare_line_chart(&table, "sales", "sales", None).unwrap();
        assert_eq!(line.points.len(), n);
        assert_eq!(line.points.last(), Some(&(11_999.0, 11_999.0)));

        let capped = prepare_line_chart(&table, "sales", "sales", Some(100)).unwrap();
        assert_eq!(capped.points.len(), 100);
    }

    #[test]
    fn line_text_x_uses_category_index() {
        let table = Table::new(
            df!(
                "month" => &["mar", "jan", "feb", "jan"],
                "sales" => &[3.0, 1.0, 2.0, 1.5]
            )
            .unwrap(),
        );
        let line = prepare_line_chart(&table, "month", "sales", None).unwrap();
        assert_eq!(line.x_axis_kind, XAxisTemporalKind::Categorical);
        assert_eq!(line.x_categories, vec!["feb", "jan", "mar"]);
        assert_eq!(
            line.points,
            vec![(0.0, 2.0), (1.0, 1.0), (1.0, 1.5), (2.0, 3.0)]
        );
        assert_eq!(line.format_x(1.0), "jan");
        assert_eq!(line.title, "sales over month");
    }

    #[test]
    fn line_date_x_formats_as_dates() {
        let day = Series::new("day".into(), &[1i32, 0])
            .cast(&DataType::Date)
            .unwrap();
        let df = DataFrame::new(vec![
            day.into(),
            Series::new("sales".into(), &[2.0, 1.0]).into(),
        ])
        .unwrap();
        let line = prepare_line_chart(&Table::new(df), "day", "sales", None).unwrap();
        assert_eq!(line.x_axis_kind, XAxisTemporalKind::Date);
        assert_eq!(line.points, vec![(0.0, 1.0), (1.0, 2.0)]);
        assert_eq!(line.format_x(1.0), "1970-01-02");
    }

    #[test]
    fn line_missing_x_column_errors() {
        let table = Table::new(df!("y" => &[1.0]).unwrap());
        assert!(prepare_line_chart(&table, "missing", "y", None).is_err());
    }

    #[test]
    fn heatmap_annotations_and_colors() {
        let table = Table::new(
            df!(
                "a" => &[1.0, 2.0, 3.0],
                "b" => &[3.0, 2.0, 1.0],
                "flat" => &[5.0, 5.0, 5.0]
            )
            .unwrap(),
        );
        let cols = vec!["a".to_string(), "b".to_string(), "flat".to_string()];
        let heatmap = prepare_heatmap(&table, &cols).unwrap().unwrap();
        assert_eq!(heatmap.annotation(0, 1), "-1.00");
        assert_eq!(heatmap.annotation(2, 2), "nan");
        assert_eq!(heatmap.cell_rgb(0, 1), Some((59, 76, 192)));
        assert_eq!(heatmap.cell_rgb(0, 0), Some((180, 4, 38)));
        assert_eq!(heatmap.cell_rgb(0, 2), None);
    }

    #[test]
    fn coolwarm_midpoint_is_grey() {
        assert_eq!(coolwarm(0.5), (221, 221, 221));
        assert_eq!(coolwarm(-3.0), coolwarm(0.0));
    }

    #[test]
    fn axis_labels() {
        assert_eq!(format_axis_label(12.5), "12.50");
        assert_eq!(format_axis_label(2_000_000.0), "2.00e6");
        assert_eq!(
            format_x_axis_label(0.0, XAxisTemporalKind::Date),
            "1970-01-01"
        );
    }
}
