use polars::prelude::*;

/// The loaded data: named, equal-length columns. Built once per upload and never edited.
#[derive(Clone, Debug)]
pub struct Table {
    df: DataFrame,
}

impl Table {
    pub fn new(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    /// Lazy view over the table, for chart queries.
    pub fn lazy(&self) -> LazyFrame {
        self.df.clone().lazy()
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.df.width()
    }

    pub fn is_empty(&self) -> bool {
        self.df.width() == 0
    }

    /// Column names in table order
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn dtype(&self, name: &str) -> Option<&DataType> {
        self.df.column(name).ok().map(|c| c.dtype())
    }

    /// Rows `offset..offset + len`, clamped to the table
    pub fn window(&self, offset: usize, len: usize) -> DataFrame {
        let offset = offset.min(self.height());
        self.df.slice(offset as i64, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_is_clamped() {
        let table = Table::new(df!("a" => &[1, 2, 3, 4, 5]).unwrap());
        assert_eq!(table.window(1, 2).height(), 2);
        assert_eq!(table.window(4, 10).height(), 1);
        assert_eq!(table.window(10, 10).height(), 0);
    }

    #[test]
    fn test_column_names_in_order() {
        let table = Table::new(df!("b" => &[1], "a" => &["x"]).unwrap());
        assert_eq!(table.column_names(), vec!["b", "a"]);
        assert_eq!(table.dtype("a"), Some(&DataType::String));
        assert_eq!(table.dtype("missing"), None);
    }
}
