use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Cell, Paragraph, Row, Table, Widget},
};

use crate::statistics::SummaryStatistics;

/// Summary statistics as a table: one row per statistic, one column per table column.
pub struct SummaryTable<'a> {
    stats: &'a SummaryStatistics,
    pub header_fg: Color,
    pub label_fg: Color,
    pub start_col: usize,
}

impl<'a> SummaryTable<'a> {
    pub fn new(stats: &'a SummaryStatistics) -> Self {
        Self {
            stats,
            header_fg: Color::Cyan,
            label_fg: Color::DarkGray,
            start_col: 0,
        }
    }

    pub fn with_colors(mut self, header_fg: Color, label_fg: Color) -> Self {
        self.header_fg = header_fg;
        self.label_fg = label_fg;
        self
    }

    pub fn with_start_col(mut self, start_col: usize) -> Self {
        self.start_col = start_col;
        self
    }
}

impl Widget for SummaryTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let names = self.stats.column_names();
        if names.is_empty() {
            Paragraph::new("No columns to summarize")
                .style(Style::default().fg(self.label_fg))
                .render(area, buf);
            return;
        }

        let rows = self.stats.rows();
        let start = self.start_col.min(names.len().saturating_sub(1));
        let label_width = rows
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0) as u16;

        let mut widths = vec![Constraint::Length(label_width)];
        for (i, name) in names.iter().enumerate().skip(start) {
            let cell_width = rows
                .iter()
                .filter_map(|(_, cells)| cells.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0) as u16;
            widths.push(Constraint::Length(cell_width));
        }

        let header = Row::new(
            std::iter::once(Cell::from(""))
                .chain(names.iter().skip(start).map(|n| Cell::from(n.to_string()))),
        )
        .style(
            Style::default()
                .fg(self.header_fg)
                .add_modifier(Modifier::BOLD),
        );

        let body = rows.iter().map(|(label, cells)| {
            Row::new(
                std::iter::once(Cell::from(Span::styled(
                    *label,
                    Style::default().fg(self.label_fg),
                )))
                .chain(cells.iter().skip(start).map(|c| Cell::from(c.clone()))),
            )
        });

        Table::new(body, widths)
            .header(header)
            .column_spacing(2)
            .render(area, buf);
    }
}
