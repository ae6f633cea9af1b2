use color_eyre::Result;
use polars::polars_compute::rolling::QuantileMethod;
use polars::prelude::*;
use std::collections::HashMap;

use crate::classify::ColumnClassification;
use crate::table::Table;

/// Row labels of the numeric summary, top to bottom.
pub const NUMERIC_STAT_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];
/// Row labels of the text-only summary.
pub const CATEGORICAL_STAT_LABELS: [&str; 4] = ["count", "unique", "top", "freq"];

/// Per-column summary of a numeric column. Everything but `count` is NaN when the column
/// has no values (std also needs two).
#[derive(Clone, Debug, PartialEq)]
pub struct NumericSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl NumericSummary {
    /// Values in [`NUMERIC_STAT_LABELS`] order
    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoricalSummary {
    pub name: String,
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

/// The summary statistics section. Numeric columns win; a table without any falls back
/// to describing its text columns.
#[derive(Clone, Debug, PartialEq)]
pub enum SummaryStatistics {
    Numeric(Vec<NumericSummary>),
    Categorical(Vec<CategoricalSummary>),
    Empty,
}

impl SummaryStatistics {
    pub fn column_names(&self) -> Vec<&str> {
        match self {
            Self::Numeric(cols) => cols.iter().map(|c| c.name.as_str()).collect(),
            Self::Categorical(cols) => cols.iter().map(|c| c.name.as_str()).collect(),
            Self::Empty => Vec::new(),
        }
    }

    /// Rows as (label, formatted cell per column), ready for a table widget.
    pub fn rows(&self) -> Vec<(&'static str, Vec<String>)> {
        match self {
            Self::Numeric(cols) => NUMERIC_STAT_LABELS
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    let cells = cols
                        .iter()
                        .map(|c| {
                            if i == 0 {
                                c.count.to_string()
                            } else {
                                format_stat(c.values()[i])
                            }
                        })
                        .collect();
                    (*label, cells)
                })
                .collect(),
            Self::Categorical(cols) => CATEGORICAL_STAT_LABELS
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    let cells = cols
                        .iter()
                        .map(|c| match i {
                            0 => c.count.to_string(),
                            1 => c.unique.to_string(),
                            2 => c.top.clone().unwrap_or_else(|| "NaN".to_string()),
                            _ => c.freq.to_string(),
                        })
                        .collect();
                    (*label, cells)
                })
                .collect(),
            Self::Empty => Vec::new(),
        }
    }
}

/// Six decimals, `NaN` for undefined values.
pub fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.6}", value)
    }
}

/// Summary statistics per numeric column, or per text column when there are no numeric ones.
pub fn describe(table: &Table, classification: &ColumnClassification) -> Result<SummaryStatistics> {
    let df = table.df();
    if !classification.numeric.is_empty() {
        let mut summaries = Vec::with_capacity(classification.numeric.len());
        for name in &classification.numeric {
            let series = df.column(name)?.as_materialized_series();
            summaries.push(numeric_summary(name, series)?);
        }
        return Ok(SummaryStatistics::Numeric(summaries));
    }
    if !classification.categorical.is_empty() {
        let mut summaries = Vec::with_capacity(classification.categorical.len());
        for name in &classification.categorical {
            let series = df.column(name)?.as_materialized_series();
            summaries.push(categorical_summary(name, series)?);
        }
        return Ok(SummaryStatistics::Categorical(summaries));
    }
    Ok(SummaryStatistics::Empty)
}

/// Column values as f64, None for nulls and NaN.
pub(crate) fn numeric_values(series: &Series) -> Result<Vec<Option<f64>>> {
    let cast = series.cast(&DataType::Float64)?;
    Ok(cast
        .f64()?
        .iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

fn numeric_summary(name: &str, series: &Series) -> Result<NumericSummary> {
    // nulls and NaN both count as missing
    let values = Series::new(name.into(), numeric_values(series)?);
    let count = values.len() - values.null_count();
    let ca = values.f64()?;

    let quantile = |q: f64| -> Result<f64> {
        Ok(ca
            .quantile(q, QuantileMethod::Linear)?
            .unwrap_or(f64::NAN))
    };

    Ok(NumericSummary {
        name: name.to_string(),
        count,
        mean: values.mean().unwrap_or(f64::NAN),
        // sample std (ddof=1), undefined below two values
        std: if count < 2 {
            f64::NAN
        } else {
            values.std(1).unwrap_or(f64::NAN)
        },
        min: values.min::<f64>()?.unwrap_or(f64::NAN),
        q25: quantile(0.25)?,
        median: quantile(0.5)?,
        q75: quantile(0.75)?,
        max: values.max::<f64>()?.unwrap_or(f64::NAN),
    })
}

fn categorical_summary(name: &str, series: &Series) -> Result<CategoricalSummary> {
    let counts = frequency_counts(series)?;
    let (top, freq) = match counts.first() {
        Some((value, n)) => (Some(value.clone()), *n),
        None => (None, 0),
    };
    Ok(CategoricalSummary {
        name: name.to_string(),
        count: series.len() - series.null_count(),
        unique: counts.len(),
        top,
        freq,
    })
}

/// Count of each distinct non-null value, most frequent first. Ties keep the order in
/// which values first appear.
pub fn frequency_counts(series: &Series) -> Result<Vec<(String, usize)>> {
    let strings = series.cast(&DataType::String)?;
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in strings.str()?.iter().flatten() {
        match counts.get_mut(value) {
            Some(n) => *n += 1,
            None => {
                counts.insert(value.to_string(), 1);
                order.push(value.to_string());
            }
        }
    }
    let mut result: Vec<(String, usize)> = order
        .into_iter()
        .map(|value| {
            let n = counts.get(&value).copied().unwrap_or(0);
            (value, n)
        })
        .collect();
    // stable: equal counts stay in first-appearance order
    result.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(result)
}

// Correlation matrix structures
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Square and symmetric; NaN where the coefficient is undefined
    pub correlations: Vec<Vec<f64>>,
    /// Complete pairs behind each coefficient
    pub sample_sizes: Vec<Vec<usize>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.correlations.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Pearson correlation between every pair of `columns`, each pair over the rows where
/// both values are present.
pub fn correlation_matrix(table: &Table, columns: &[String]) -> Result<CorrelationMatrix> {
    let df = table.df();
    let mut values = Vec::with_capacity(columns.len());
    for name in columns {
        values.push(numeric_values(df.column(name)?.as_materialized_series())?);
    }

    let n = columns.len();
    let mut correlations = vec![vec![f64::NAN; n]; n];
    let mut sample_sizes = vec![vec![0; n]; n];

    for i in 0..n {
        for j in i..n {
            let (x, y): (Vec<f64>, Vec<f64>) = values[i]
                .iter()
                .zip(values[j].iter())
                .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                .unzip();
            sample_sizes[i][j] = x.len();
            sample_sizes[j][i] = x.len();

            let r = if i == j {
                if variance_sum(&x) > 0.0 {
                    1.0
                } else {
                    f64::NAN
                }
            } else {
                pearson(&x, &y)
            };
            correlations[i][j] = r;
            correlations[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: columns.to_vec(),
        correlations,
        sample_sizes,
    })
}

fn variance_sum(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum()
}

/// Pearson coefficient of two equal-length samples. NaN with fewer than two points or
/// when either side has no variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    let mean_x = x.iter().sum::<f64>() / x.len() as f64;
    let mean_y = y.iter().sum::<f64>() / y.len() as f64;

    let numerator: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(a, b)| (a - mean_x) * (b - mean_y))
        .sum();
    let var_x: f64 = x.iter().map(|v| (v - mean_x).powi(2)).sum();
    let var_y: f64 = y.iter().map(|v| (v - mean_y).powi(2)).sum();

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (numerator / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;

    #[test]
    fn test_numeric_summary_interpolates_quartiles() {
        let s = Series::new(
            "v".into(),
            &[Some(4.0), None, Some(1.0), Some(3.0), Some(2.0), Some(f64::NAN)],
        );
        let summary = numeric_summary("v", &s).unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 2.5);
        assert!((summary.std - 1.2909944487358056).abs() < 1e-12);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q25, 1.75);
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.q75, 3.25);
        assert_eq!(summary.max, 4.0);
    }

    #[test]
    fn test_single_value_has_undefined_std() {
        let s = Series::new("v".into(), &[7i64]);
        let summary = numeric_summary("v", &s).unwrap();
        assert_eq!(summary.count, 1);
        assert!(summary.std.is_nan());
        assert_eq!(summary.median, 7.0);
    }

    #[test]
    fn test_all_null_column_is_nan_not_error() {
        let df = df!("sales" => &[None::<f64>, None]).unwrap();
        let table = Table::new(df);
        let stats = describe(&table, &classify(&table)).unwrap();
        let SummaryStatistics::Numeric(cols) = stats else {
            panic!("expected numeric summary");
        };
        assert_eq!(cols[0].count, 0);
        assert!(cols[0].mean.is_nan());
        assert!(cols[0].max.is_nan());
    }

    #[test]
    fn test_text_only_table_falls_back_to_counts() {
        let df = df!("region" => &["north", "south", "north"]).unwrap();
        let table = Table::new(df);
        let stats = describe(&table, &classify(&table)).unwrap();
        assert_eq!(
            stats,
            SummaryStatistics::Categorical(vec![CategoricalSummary {
                name: "region".to_string(),
                count: 3,
                unique: 2,
                top: Some("north".to_string()),
                freq: 2,
            }])
        );
        assert_eq!(stats.rows()[2], ("top", vec!["north".to_string()]));
    }

    #[test]
    fn test_frequency_ties_keep_first_appearance() {
        let s = Series::new("c".into(), &["b", "a", "a", "b", "c"]);
        let counts = frequency_counts(&s).unwrap();
        assert_eq!(
            counts,
            vec![("b".to_string(), 2), ("a".to_string(), 2), ("c".to_string(), 1)]
        );
    }

    #[test]
    fn test_pearson_degenerate_inputs() {
        assert!(pearson(&[1.0], &[2.0]).is_nan());
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]), -1.0);
    }

    #[test]
    fn test_format_stat() {
        assert_eq!(format_stat(2.5), "2.500000");
        assert_eq!(format_stat(f64::NAN), "NaN");
    }
}
