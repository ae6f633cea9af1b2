use std::borrow::Cow;

use polars::prelude::*;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, StatefulWidget, Table as TableWidget, Widget},
};

use crate::table::Table;

/// Scroll position of the raw data view. Only the visible window is ever materialized.
#[derive(Debug, Default, Clone)]
pub struct DataTableState {
    pub start_row: usize,
    pub start_col: usize,
    pub visible_rows: usize,
    num_rows: usize,
    num_cols: usize,
}

impl DataTableState {
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            ..Self::default()
        }
    }

    pub fn reset(&mut self, num_rows: usize, num_cols: usize) {
        *self = Self {
            visible_rows: self.visible_rows,
            ..Self::new(num_rows, num_cols)
        };
    }

    fn max_start_row(&self) -> usize {
        self.num_rows.saturating_sub(self.visible_rows.max(1))
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.start_row = (self.start_row + rows).min(self.max_start_row());
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.start_row = self.start_row.saturating_sub(rows);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.visible_rows.max(1));
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.visible_rows.max(1));
    }

    pub fn scroll_to_start(&mut self) {
        self.start_row = 0;
    }

    pub fn scroll_to_end(&mut self) {
        self.start_row = self.max_start_row();
    }

    pub fn scroll_right(&mut self) {
        if self.start_col + 1 < self.num_cols {
            self.start_col += 1;
        }
    }

    pub fn scroll_left(&mut self) {
        self.start_col = self.start_col.saturating_sub(1);
    }
}

/// Raw data view over a [`Table`].
pub struct DataTable<'a> {
    table: &'a Table,
    pub header_fg: Color,
    pub row_numbers_fg: Color,
    pub table_cell_padding: u16,
    pub max_column_width: u16,
    pub row_numbers: bool,
}

impl<'a> DataTable<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self {
            table,
            header_fg: Color::Cyan,
            row_numbers_fg: Color::DarkGray,
            table_cell_padding: 2,
            max_column_width: 40,
            row_numbers: false,
        }
    }

    pub fn with_colors(mut self, header_fg: Color, row_numbers_fg: Color) -> Self {
        self.header_fg = header_fg;
        self.row_numbers_fg = row_numbers_fg;
        self
    }

    pub fn with_cell_padding(mut self, padding: u16) -> Self {
        self.table_cell_padding = padding;
        self
    }

    pub fn with_max_column_width(mut self, width: u16) -> Self {
        self.max_column_width = width;
        self
    }

    pub fn with_row_numbers(mut self, enabled: bool) -> Self {
        self.row_numbers = enabled;
        self
    }

    fn render_dataframe(&self, df: &DataFrame, area: Rect, buf: &mut Buffer) {
        let (height, cols) = df.shape();
        let names = df.get_column_names();

        // widths start at the length of each column name
        let mut widths: Vec<u16> = Vec::new();
        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); height];
        let mut used_width = 0;

        for col_index in 0..cols {
            let col_data = &df[col_index];
            let mut max_len = names[col_index].chars().count() as u16;
            let mut cells = Vec::with_capacity(height);
            for row_index in 0..height {
                let val_str: Cow<str> = match col_data.get(row_index) {
                    Ok(AnyValue::Null) | Err(_) => Cow::Borrowed(""),
                    Ok(value) => value.str_value(),
                };
                max_len = max_len.max(val_str.chars().count() as u16);
                cells.push(Cell::from(Line::from(val_str.into_owned())));
            }
            let max_len = max_len.min(self.max_column_width);

            // Use > not >= so the last column is shown when it fits exactly
            let overflows = (used_width + max_len) > area.width;
            if overflows && !widths.is_empty() {
                break;
            }
            let width = if overflows {
                area.width.saturating_sub(used_width)
            } else {
                max_len
            };
            widths.push(width);
            used_width += width + self.table_cell_padding;
            for (row, cell) in rows.iter_mut().zip(cells) {
                row.push(cell);
            }
        }

        let visible_columns = widths.len();
        let headers: Vec<Span> = names
            .iter()
            .take(visible_columns)
            .map(|name| Span::raw(name.to_string()))
            .collect();

        Widget::render(
            TableWidget::new(rows.into_iter().map(Row::new), widths)
                .column_spacing(self.table_cell_padding)
                .header(
                    Row::new(headers).style(
                        Style::default()
                            .fg(self.header_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                ),
            area,
            buf,
        );
    }

    fn render_row_numbers(&self, area: Rect, buf: &mut Buffer, start_row: usize, count: usize) {
        let style = Style::default().fg(self.row_numbers_fg);
        let width = area.width.saturating_sub(1) as usize;
        for i in 0..count.min(area.height.saturating_sub(1) as usize) {
            let text = format!("{:>width$}", start_row + i, width = width);
            Paragraph::new(text).style(style).render(
                Rect {
                    x: area.x,
                    y: area.y + 1 + i as u16,
                    width: area.width,
                    height: 1,
                },
                buf,
            );
        }
    }
}

impl StatefulWidget for DataTable<'_> {
    type State = DataTableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        // one row for the header
        state.visible_rows = area.height.saturating_sub(1) as usize;
        state.num_rows = self.table.height();
        state.num_cols = self.table.width();
        state.start_row = state.start_row.min(state.max_start_row());

        let window = self.table.window(state.start_row, state.visible_rows);
        let window = if state.start_col > 0 {
            let keep: Vec<PlSmallStr> = window
                .get_column_names()
                .into_iter()
                .skip(state.start_col)
                .cloned()
                .collect();
            window.select(keep).unwrap_or(window)
        } else {
            window
        };

        let mut table_area = area;
        if self.row_numbers && window.height() > 0 {
            // row labels are 0-based like the row index of the loaded table
            let last = state.start_row + window.height() - 1;
            let num_width = last.to_string().len() as u16 + 1;
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(num_width), Constraint::Fill(1)])
                .split(area);
            self.render_row_numbers(chunks[0], buf, state.start_row, window.height());
            table_area = chunks[1];
        }

        self.render_dataframe(&window, table_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(n: i64) -> Table {
        let values: Vec<i64> = (0..n).collect();
        Table::new(df!("id" => values).unwrap())
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut state = DataTableState::new(10, 1);
        state.visible_rows = 4;
        state.scroll_down(100);
        assert_eq!(state.start_row, 6);
        state.page_up();
        assert_eq!(state.start_row, 2);
        state.scroll_up(100);
        assert_eq!(state.start_row, 0);
        state.scroll_to_end();
        assert_eq!(state.start_row, 6);
    }

    #[test]
    fn test_render_shows_header_and_window() {
        let t = table(50);
        let mut state = DataTableState::new(50, 1);
        state.start_row = 10;
        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        DataTable::new(&t).render(area, &mut buf, &mut state);

        let row = |y: u16| -> String { (0..20).map(|x| buf[(x, y)].symbol().to_string()).collect() };
        assert!(row(0).starts_with("id"));
        assert!(row(1).starts_with("10"));
        assert_eq!(state.visible_rows, 3);
    }

    #[test]
    fn test_column_scroll_stops_at_last_column() {
        let mut state = DataTableState::new(1, 2);
        state.scroll_right();
        state.scroll_right();
        assert_eq!(state.start_col, 1);
        state.scroll_left();
        assert_eq!(state.start_col, 0);
    }
}
