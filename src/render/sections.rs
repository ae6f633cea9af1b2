//! The dashboard sections, one on screen at a time.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::prelude::{StatefulWidget, Widget};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Tabs};

use crate::dashboard::Dashboard;
use crate::render::context::RenderContext;
use crate::render::layout::section_layout;
use crate::selection::{ChartKind, ChartSelection};
use crate::table::Table;
use crate::widgets::chart::{BarChartView, HeatmapView, LineChartView, PieChartView};
use crate::widgets::datatable::{DataTable, DataTableState};
use crate::widgets::selector::SelectorBar;
use crate::widgets::summary::SummaryTable;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    RawData,
    Summary,
    Bar,
    Pie,
    Line,
    Heatmap,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::RawData,
        Section::Summary,
        Section::Bar,
        Section::Pie,
        Section::Line,
        Section::Heatmap,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::RawData => "Raw Data",
            Section::Summary => "Summary Statistics",
            Section::Bar => "Bar Chart",
            Section::Pie => "Pie Chart",
            Section::Line => "Line Plot",
            Section::Heatmap => "Correlation Heatmap",
        }
    }

    /// The chart whose selectors this section shows.
    pub fn chart(self) -> Option<ChartKind> {
        match self {
            Section::Bar => Some(ChartKind::Bar),
            Section::Pie => Some(ChartKind::Pie),
            Section::Line => Some(ChartKind::Line),
            _ => None,
        }
    }

    fn index(self) -> usize {
        Section::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Section::ALL[(self.index() + 1) % Section::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let len = Section::ALL.len();
        Section::ALL[(self.index() + len - 1) % len]
    }
}

/// Tab strip naming every section, the current one highlighted.
pub fn render_section_tabs(area: Rect, buf: &mut Buffer, current: Section, ctx: &RenderContext) {
    Tabs::new(Section::ALL.iter().map(|s| s.title()))
        .select(current.index())
        .style(Style::default().fg(ctx.text_secondary))
        .highlight_style(
            Style::default()
                .fg(ctx.primary)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        )
        .render(area, buf);
}

/// Borrowed pieces of the app a section needs.
pub struct SectionView<'a> {
    pub section: Section,
    pub table: &'a Table,
    pub dashboard: &'a Dashboard,
    pub selection: &'a ChartSelection,
    pub summary_start_col: usize,
    pub ctx: &'a RenderContext,
}

fn chart_block(title: &str, ctx: &RenderContext) -> Block<'static> {
    Block::default().title(
        Line::from(Span::styled(
            title.to_string(),
            Style::default()
                .fg(ctx.text_primary)
                .add_modifier(Modifier::BOLD),
        ))
        .centered(),
    )
}

fn render_message(message: &str, area: Rect, buf: &mut Buffer, ctx: &RenderContext) {
    Paragraph::new(message)
        .style(Style::default().fg(ctx.text_secondary))
        .centered()
        .render(area, buf);
}

pub fn render_section(
    area: Rect,
    buf: &mut Buffer,
    view: SectionView<'_>,
    datatable_state: &mut DataTableState,
) {
    let ctx = view.ctx;
    let chart = view.section.chart();
    let layout = section_layout(area, chart.is_some());

    Paragraph::new(view.section.title())
        .style(
            Style::default()
                .fg(ctx.primary)
                .add_modifier(Modifier::BOLD),
        )
        .render(layout.header, buf);

    if let (Some(chart), Some(selectors)) = (chart, layout.selectors) {
        SelectorBar {
            selection: view.selection,
            chart,
            active: true,
            ctx,
        }
        .render(selectors, buf);
    }

    let body = layout.body;
    match view.section {
        Section::RawData => {
            DataTable::new(view.table)
                .with_colors(ctx.table_header, ctx.dimmed)
                .with_cell_padding(ctx.table_cell_padding)
                .with_max_column_width(ctx.max_column_width)
                .with_row_numbers(ctx.row_numbers)
                .render(body, buf, datatable_state);
        }
        Section::Summary => {
            SummaryTable::new(&view.dashboard.summary)
                .with_colors(ctx.table_header, ctx.text_secondary)
                .with_start_col(view.summary_start_col)
                .render(body, buf);
        }
        Section::Bar => match &view.dashboard.bar {
            Some(data) => {
                let block = chart_block(&data.title, ctx);
                let inner = block.inner(body);
                block.render(body, buf);
                BarChartView { data, ctx }.render(inner, buf);
            }
            None => render_message(
                "Needs a categorical and a numeric column",
                body,
                buf,
                ctx,
            ),
        },
        Section::Pie => match &view.dashboard.pie {
            Some(data) => {
                let block = chart_block(&data.title, ctx);
                let inner = block.inner(body);
                block.render(body, buf);
                PieChartView { data, ctx }.render(inner, buf);
            }
            None => render_message("Needs a categorical column", body, buf, ctx),
        },
        Section::Line => match &view.dashboard.line {
            Some(data) => {
                let block = chart_block(&data.title, ctx);
                let inner = block.inner(body);
                block.render(body, buf);
                LineChartView { data, ctx }.render(inner, buf);
            }
            None => render_message("Needs a numeric column for the y-axis", body, buf, ctx),
        },
        // below two numeric columns only the header is shown
        Section::Heatmap => {
            if let Some(data) = &view.dashboard.heatmap {
                HeatmapView { data, ctx }.render(body, buf);
            }
        }
    }
}
