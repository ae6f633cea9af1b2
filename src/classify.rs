//! Split a table's columns into the numeric and categorical sets the chart selectors offer.

use polars::prelude::DataType;

use crate::table::Table;

/// Numeric and categorical column names, each in table order. Disjoint; columns of any
/// other type (dates, times, booleans) are in neither set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnClassification {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnClassification {
    pub fn is_numeric(&self, name: &str) -> bool {
        self.numeric.iter().any(|c| c == name)
    }

    pub fn is_categorical(&self, name: &str) -> bool {
        self.categorical.iter().any(|c| c == name)
    }
}

fn is_numeric_type(dtype: &DataType) -> bool {
    dtype.is_numeric()
}

fn is_categorical_type(dtype: &DataType) -> bool {
    dtype.is_string() || dtype.is_categorical()
}

/// Classify by the dtype the loader inferred. An all-null column counts as whatever
/// type the parser gave it.
pub fn classify(table: &Table) -> ColumnClassification {
    let mut classification = ColumnClassification::default();
    for column in table.df().get_columns() {
        let dtype = column.dtype();
        if is_numeric_type(dtype) {
            classification.numeric.push(column.name().to_string());
        } else if is_categorical_type(dtype) {
            classification.categorical.push(column.name().to_string());
        }
    }
    tracing::debug!(
        numeric = ?classification.numeric,
        categorical = ?classification.categorical,
        "columns classified"
    );
    classification
}

/// Every column, for the line chart x-axis.
pub fn all_columns(table: &Table) -> Vec<String> {
    table.column_names()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_classify_keeps_table_order() {
        let df = df!(
            "store" => &["a", "b"],
            "sales" => &[1.5, 2.5],
            "open" => &[true, false],
            "units" => &[3i64, 4],
        )
        .unwrap();
        let c = classify(&Table::new(df));
        assert_eq!(c.numeric, vec!["sales", "units"]);
        assert_eq!(c.categorical, vec!["store"]);
        assert!(!c.is_numeric("open") && !c.is_categorical("open"));
    }

    #[test]
    fn test_temporal_columns_only_in_all_columns() {
        let day = Series::new("day".into(), &[0i32, 1])
            .cast(&DataType::Date)
            .unwrap();
        let df = DataFrame::new(vec![
            day.into(),
            Series::new("sales".into(), &[1i64, 2]).into(),
        ])
        .unwrap();
        let table = Table::new(df);
        let c = classify(&table);
        assert_eq!(c.numeric, vec!["sales"]);
        assert!(c.categorical.is_empty());
        assert_eq!(all_columns(&table), vec!["day", "sales"]);
    }

    #[test]
    fn test_empty_table_gives_empty_sets() {
        let c = classify(&Table::new(DataFrame::empty()));
        assert_eq!(c, ColumnClassification::default());
    }
}
